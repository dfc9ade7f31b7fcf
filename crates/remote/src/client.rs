//! HTTP client for the hosted store's REST row API.
//!
//! Every table is exposed under `{base}/rest/v1/{table}` with filters passed as
//! query parameters (`id=eq.{id}`, `user_id=in.(a,b)`). Writes ask for the
//! written rows back with `Prefer: return=representation`. Remote procedures
//! live under `{base}/rest/v1/rpc/{name}`.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use tirelire_core::auth::Session;
use tirelire_core::catalog::{AccountType, Beneficiary, CatalogRepositoryTrait, Enseigne};
use tirelire_core::collaborations::{Collaboration, CollaborationRepositoryTrait};
use tirelire_core::constants::SYNC_SAVINGS_GOAL_RPC;
use tirelire_core::contributions::{
    Contribution, ContributionRepositoryTrait, ContributionUpdate, NewContribution,
};
use tirelire_core::errors::{Error, RemoteError, Result};
use tirelire_core::incomes::{Income, IncomeRepositoryTrait};
use tirelire_core::profile::{Profile, ProfileRepositoryTrait};

use crate::config::RemoteConfig;

const CONTRIBUTION_SELECT: &str = "*,account_types(name)";
const ENSEIGNE_SELECT: &str = "*,categories(name)";

// ─────────────────────────────────────────────────────────────────────────────
// Shared HTTP plumbing (also used by the auth client)
// ─────────────────────────────────────────────────────────────────────────────

/// Error body shapes returned by the row API and the auth endpoints.
#[derive(Debug, Default, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))
}

pub(crate) fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidConfigValue(format!("Invalid {} format: {}", what, e)))
}

pub(crate) fn transport_error(e: reqwest::Error) -> Error {
    Error::Remote(RemoteError::RequestFailed(e.to_string()))
}

/// Turns a non-success answer into `RemoteError::Rejected`, keeping the
/// store's own message untouched.
pub(crate) fn rejection(status: StatusCode, body: &str) -> Error {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error_description)
        .or(parsed.msg)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() || body.starts_with('{') {
                format!("HTTP {}", status)
            } else {
                body.chars().take(200).collect()
            }
        });
    Error::Remote(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        Error::Remote(RemoteError::InvalidResponse(format!(
            "Failed to read response: {}",
            e
        )))
    })?;
    Ok((status, body))
}

/// Parses a JSON answer, or the store's rejection.
pub(crate) async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let (status, body) = read_body(response).await?;
    if !status.is_success() {
        return Err(rejection(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| {
        Error::Remote(RemoteError::InvalidResponse(format!(
            "{} - {}",
            e,
            body.chars().take(200).collect::<String>()
        )))
    })
}

/// Checks the status of an answer whose body is ignored.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<()> {
    let (status, body) = read_body(response).await?;
    if !status.is_success() {
        return Err(rejection(status, &body));
    }
    Ok(())
}

/// `in.(a,b,c)` filter value.
fn in_filter(values: &[String]) -> String {
    let encoded: Vec<String> = values
        .iter()
        .map(|v| urlencoding::encode(v).into_owned())
        .collect();
    format!("in.({})", encoded.join(","))
}

fn eq_filter(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

fn first_row<T>(rows: Vec<T>, table: &str, id: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::Remote(RemoteError::NotFound(format!("{} {}", table, id))))
}

// ─────────────────────────────────────────────────────────────────────────────
// Store client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the hosted store.
///
/// Requests are authorized with the signed-in user's access token when one is
/// set, with the public key otherwise. Row-level security on the store decides
/// what each user may read or write.
///
/// # Example
///
/// ```ignore
/// let config = RemoteConfig::from_env()?;
/// let client = RemoteStoreClient::new(&config)?.with_session(&session)?;
/// let contributions = client.list(&[session.user.id.clone()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteStoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: HeaderValue,
    auth_header: HeaderValue,
}

impl RemoteStoreClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let api_key = header_value(&config.anon_key, "API key")?;
        let auth_header = header_value(&format!("Bearer {}", config.anon_key), "API key")?;

        Ok(Self {
            http: build_http_client(config.request_timeout)?,
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key,
            auth_header,
        })
    }

    /// A copy of this client acting as the session's user.
    pub fn with_session(&self, session: &Session) -> Result<Self> {
        self.with_access_token(&session.access_token)
    }

    pub fn with_access_token(&self, access_token: &str) -> Result<Self> {
        Ok(Self {
            auth_header: header_value(&format!("Bearer {}", access_token), "access token")?,
            ..self.clone()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, returning_rows: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers.insert(HeaderName::from_static("apikey"), self.api_key.clone());
        if returning_rows {
            headers.insert(
                HeaderName::from_static("prefer"),
                HeaderValue::from_static("return=representation"),
            );
        }
        headers
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        if !query.is_empty() {
            let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            url = format!("{}?{}", url, params.join("&"));
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        debug!("[RemoteStore] {} {}", method, url);
        let returning_rows = method != Method::GET && method != Method::DELETE;
        let mut request = self
            .http
            .request(method, url)
            .headers(self.headers(returning_rows));
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(transport_error)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query);
        let response = self.send::<()>(Method::GET, &url, None).await?;
        parse_response(response).await
    }

    async fn write<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query);
        let response = self.send(method, &url, Some(body)).await?;
        parse_response(response).await
    }

    /// Calls a remote procedure and ignores its result.
    pub async fn rpc<B: Serialize + ?Sized>(&self, name: &str, args: &B) -> Result<()> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, name);
        let response = self.send(Method::POST, &url, Some(args)).await?;
        expect_success(response).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository trait implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ContributionRepositoryTrait for RemoteStoreClient {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Contribution>> {
        let contributions: Vec<Contribution> = self
            .select(
                "contributions",
                &[
                    ("select", CONTRIBUTION_SELECT.to_string()),
                    ("user_id", in_filter(owner_ids)),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?;
        info!(
            "[RemoteStore] Fetched {} contributions",
            contributions.len()
        );
        Ok(contributions)
    }

    async fn insert(&self, new_contribution: NewContribution) -> Result<Contribution> {
        let rows = self
            .write(
                Method::POST,
                "contributions",
                &[("select", CONTRIBUTION_SELECT.to_string())],
                &new_contribution,
            )
            .await?;
        first_row(rows, "contributions", "insert")
    }

    async fn update(&self, update: ContributionUpdate) -> Result<Contribution> {
        let rows = self
            .write(
                Method::PATCH,
                "contributions",
                &[
                    ("id", eq_filter(&update.id)),
                    ("select", CONTRIBUTION_SELECT.to_string()),
                ],
                &update,
            )
            .await?;
        first_row(rows, "contributions", &update.id)
    }

    async fn delete(&self, contribution_id: &str) -> Result<()> {
        let url = self.table_url("contributions", &[("id", eq_filter(contribution_id))]);
        let response = self.send::<()>(Method::DELETE, &url, None).await?;
        expect_success(response).await
    }
}

#[async_trait]
impl ProfileRepositoryTrait for RemoteStoreClient {
    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let rows: Vec<Profile> = self
            .select(
                "profiles",
                &[("select", "*".to_string()), ("id", eq_filter(user_id))],
            )
            .await?;
        match rows.into_iter().next() {
            Some(profile) => Ok(profile),
            None => {
                debug!(
                    "[RemoteStore] No profile row for {}, using defaults",
                    user_id
                );
                Ok(Profile::new(user_id))
            }
        }
    }

    async fn update_savings_goal_percentage(
        &self,
        user_id: &str,
        percentage: u8,
    ) -> Result<Profile> {
        let rows = self
            .write(
                Method::PATCH,
                "profiles",
                &[("id", eq_filter(user_id))],
                &serde_json::json!({ "savings_goal_percentage": percentage }),
            )
            .await?;
        first_row(rows, "profiles", user_id)
    }

    async fn sync_savings_goal_percentage(&self, percentage: u8) -> Result<()> {
        self.rpc(
            SYNC_SAVINGS_GOAL_RPC,
            &serde_json::json!({ "new_percentage": percentage }),
        )
        .await
    }
}

#[async_trait]
impl IncomeRepositoryTrait for RemoteStoreClient {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Income>> {
        self.select(
            "incomes",
            &[("select", "*".to_string()), ("user_id", in_filter(owner_ids))],
        )
        .await
    }
}

#[async_trait]
impl CollaborationRepositoryTrait for RemoteStoreClient {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Collaboration>> {
        let user = urlencoding::encode(user_id);
        self.select(
            "collaborations",
            &[
                ("select", "*".to_string()),
                (
                    "or",
                    format!("(requester_id.eq.{},addressee_id.eq.{})", user, user),
                ),
            ],
        )
        .await
    }
}

#[async_trait]
impl CatalogRepositoryTrait for RemoteStoreClient {
    async fn list_account_types(&self) -> Result<Vec<AccountType>> {
        self.select(
            "account_types",
            &[
                ("select", "id,name".to_string()),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_enseignes(&self) -> Result<Vec<Enseigne>> {
        self.select(
            "enseignes",
            &[
                ("select", ENSEIGNE_SELECT.to_string()),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_beneficiaries(&self, owner_ids: &[String]) -> Result<Vec<Beneficiary>> {
        self.select(
            "beneficiaries",
            &[
                ("select", "*".to_string()),
                ("user_id", in_filter(owner_ids)),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }
}
