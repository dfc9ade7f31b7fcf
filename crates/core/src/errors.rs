//! Core error types for the Tirelire application.
//!
//! This module defines backend-agnostic error types. Transport-specific errors
//! (HTTP, JSON decoding of remote rows, etc.) are converted to these types by the
//! remote adapter crate.

use chrono::ParseError as ChronoParseError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Notice shown when an action needs a signed-in user or a store handle.
pub const SIGNED_IN_REQUIRED_MESSAGE: &str = "Vous devez être connecté pour effectuer cette action";

/// Root error type for the application.
///
/// None of these are fatal: every variant ends up as a notice or as inline
/// field errors, and the user repeats the action if needed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Missing user, session or store handle. Raised before any network call.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// Expired or absent session during a sensitive flow.
    #[error("{0}")]
    Session(String),

    /// A mutation for the same record (or a create) is still in flight.
    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn signed_in_required() -> Self {
        Error::Unauthorized(SIGNED_IN_REQUIRED_MESSAGE.to_string())
    }
}

/// Errors reported by the remote store or the transport used to reach it.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The store answered and rejected the request. `message` is relayed as-is.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never got an answer (network, timeout, TLS...).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The store answered with a body we could not decode.
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Field-keyed validation messages.
///
/// Keys are the payload field names (`amount`, `start_date`, ...) so a view can
/// render each message next to its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    Fields(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// === From implementations for common error types ===

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(ValidationError::Fields(errors))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::Validation(ValidationError::InvalidId(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Remote(RemoteError::InvalidResponse(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
