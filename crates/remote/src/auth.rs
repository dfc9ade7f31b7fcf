//! Client for the hosted auth service (`{base}/auth/v1`).

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use tirelire_core::auth::{AuthServiceTrait, AuthUser, Credentials, Session};
use tirelire_core::errors::{Error, RemoteError, Result};

use crate::client::{
    build_http_client, expect_success, header_value, parse_response, transport_error,
};
use crate::config::RemoteConfig;

/// Token grant or sign-up answer. Sign-up returns only the user while the
/// email confirmation is pending.
#[derive(Debug, Deserialize)]
struct ApiAuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl ApiAuthResponse {
    fn into_session(self, now: DateTime<Utc>) -> Option<Session> {
        let access_token = self.access_token?;
        let user = self.user?;
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => DateTime::from_timestamp(at, 0),
            (None, Some(seconds)) => Some(now + ChronoDuration::seconds(seconds)),
            (None, None) => None,
        };
        Some(Session {
            access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RemoteAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: HeaderValue,
}

impl RemoteAuthClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.request_timeout)?,
            base_url: format!("{}/auth/v1", config.store_url.trim_end_matches('/')),
            api_key: header_value(&config.anon_key, "API key")?,
        })
    }

    fn headers(&self, session: Option<&Session>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static("apikey"), self.api_key.clone());
        if let Some(session) = session {
            headers.insert(
                AUTHORIZATION,
                header_value(&format!("Bearer {}", session.access_token), "access token")?,
            );
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        session: Option<&Session>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!("[RemoteAuth] POST {}", url);
        self.http
            .post(&url)
            .headers(self.headers(session)?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl AuthServiceTrait for RemoteAuthClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response = self.post("/signup", &body, None).await?;
        let answer: ApiAuthResponse = parse_response(response).await?;
        let session = answer.into_session(Utc::now());
        if session.is_none() {
            info!("[RemoteAuth] Sign-up pending email confirmation");
        }
        Ok(session)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response = self.post("/token?grant_type=password", &body, None).await?;
        let answer: ApiAuthResponse = parse_response(response).await?;
        answer.into_session(Utc::now()).ok_or_else(|| {
            Error::Remote(RemoteError::InvalidResponse(
                "Token grant returned no session".to_string(),
            ))
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .post("/logout", &serde_json::json!({}), Some(session))
            .await?;
        expect_success(response).await
    }

    async fn request_password_reset(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let path = match redirect_to {
            Some(target) => format!("/recover?redirect_to={}", urlencoding::encode(target)),
            None => "/recover".to_string(),
        };
        let response = self
            .post(&path, &serde_json::json!({ "email": email }), None)
            .await?;
        expect_success(response).await
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()> {
        let url = self.url("/user");
        debug!("[RemoteAuth] PUT {}", url);
        let response = self
            .http
            .put(&url)
            .headers(self.headers(Some(session))?)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response).await
    }
}
