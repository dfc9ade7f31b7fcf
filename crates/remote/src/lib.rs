//! Tirelire Remote - HTTP adapter for the hosted store.
//!
//! This crate implements the repository and auth traits of `tirelire-core`
//! against the hosted database service: its REST row API, its RPC endpoint
//! and its auth endpoints.

pub mod auth;
pub mod client;
pub mod config;

pub use auth::RemoteAuthClient;
pub use client::RemoteStoreClient;
pub use config::RemoteConfig;

use std::sync::Arc;
use tirelire_core::StoreHandle;

/// Store handle backed by a single remote client.
pub fn store_handle(client: RemoteStoreClient) -> StoreHandle {
    let client = Arc::new(client);
    StoreHandle {
        contributions: client.clone(),
        profiles: client.clone(),
        incomes: client.clone(),
        collaborations: client.clone(),
        catalog: client,
    }
}
