//! Tirelire Core - savings contributions, savings goal and progress.
//!
//! This crate holds the domain models, validation rules and controllers of the
//! savings feature. It is transport-agnostic and defines repository traits
//! that are implemented by the `tirelire-remote` crate.

pub mod auth;
pub mod catalog;
pub mod collaborations;
pub mod constants;
pub mod context;
pub mod contributions;
pub mod dashboard;
pub mod errors;
pub mod form;
pub mod goals;
pub mod incomes;
pub mod notices;
pub mod profile;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use context::{AppContext, StoreHandle};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
