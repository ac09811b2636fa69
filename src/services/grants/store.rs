//! Storage for issued authorization codes and access tokens.
use async_trait::async_trait;

use crate::context::GrantClaims;
use crate::services::clients::StoreResult;

#[async_trait]
pub trait GrantStore: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn put_code(&self, code: &str, claims: GrantClaims) -> StoreResult<()>;

    // Codes are single-use: a successful take removes the entry.
    async fn take_code(&self, code: &str) -> StoreResult<Option<GrantClaims>>;

    async fn put_access_token(&self, token: &str, claims: GrantClaims) -> StoreResult<()>;

    async fn find_access_token(&self, token: &str) -> StoreResult<Option<GrantClaims>>;
}
