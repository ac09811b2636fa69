//! Client registry interface consulted by the host to resolve relying-party
//! metadata before a pipeline runs.
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::ClientInformation;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors, kept apart from `AppError` so callers pick the
/// failure mode.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("client already registered: {0}")]
    Duplicate(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ClientStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find(&self, client_id: &str) -> StoreResult<Option<Arc<ClientInformation>>>;

    // Fails with `Duplicate` when the client id is taken.
    async fn insert(&self, client: ClientInformation) -> StoreResult<Arc<ClientInformation>>;
}
