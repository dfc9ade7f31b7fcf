//! Connection settings for the hosted store, read from the environment.

use std::time::Duration;
use tirelire_core::errors::{Error, Result};

pub const STORE_URL_VAR: &str = "TIRELIRE_STORE_URL";
pub const ANON_KEY_VAR: &str = "TIRELIRE_STORE_ANON_KEY";
pub const REQUEST_TIMEOUT_VAR: &str = "TIRELIRE_REQUEST_TIMEOUT_SECS";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Project URL, without the `/rest/v1` suffix
    pub store_url: String,
    /// Public key sent in the `apikey` header of every request
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl RemoteConfig {
    pub fn new(store_url: &str, anon_key: &str) -> Self {
        RemoteConfig {
            store_url: store_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::MissingConfigKey(key.to_string()))
        };

        let store_url = required(STORE_URL_VAR)?;
        if !store_url.starts_with("http://") && !store_url.starts_with("https://") {
            return Err(Error::InvalidConfigValue(format!(
                "{} must be an http(s) URL, got '{}'",
                STORE_URL_VAR, store_url
            )));
        }
        let anon_key = required(ANON_KEY_VAR)?;

        let timeout_secs = match lookup(REQUEST_TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::InvalidConfigValue(format!(
                    "{} must be a number of seconds",
                    REQUEST_TIMEOUT_VAR
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(RemoteConfig {
            request_timeout: Duration::from_secs(timeout_secs),
            ..RemoteConfig::new(&store_url, &anon_key)
        })
    }
}
