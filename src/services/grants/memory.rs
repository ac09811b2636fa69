use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::context::GrantClaims;
use crate::pipeline::strategy;
use crate::services::clients::{StoreError, StoreResult};
use crate::services::grants::store::GrantStore;

/// Process-local grant store. Entries are keyed by the SHA-256 of the token,
/// never by the raw value.
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    codes: Mutex<HashMap<Vec<u8>, GrantClaims>>,
    access_tokens: Mutex<HashMap<Vec<u8>, GrantClaims>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

/// Drops every entry that expired at or before `now`.
fn prune(entries: &mut HashMap<Vec<u8>, GrantClaims>, now: i64) {
    entries.retain(|_, claims| !claims.is_expired(now));
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("grant store lock poisoned".into())
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put_code(&self, code: &str, claims: GrantClaims) -> StoreResult<()> {
        let mut codes = self.codes.lock().map_err(poisoned)?;
        prune(&mut codes, strategy::now());
        codes.insert(key(code), claims);
        Ok(())
    }

    async fn take_code(&self, code: &str) -> StoreResult<Option<GrantClaims>> {
        Ok(self.codes.lock().map_err(poisoned)?.remove(&key(code)))
    }

    async fn put_access_token(&self, token: &str, claims: GrantClaims) -> StoreResult<()> {
        let mut tokens = self.access_tokens.lock().map_err(poisoned)?;
        prune(&mut tokens, strategy::now());
        tokens.insert(key(token), claims);
        Ok(())
    }

    async fn find_access_token(&self, token: &str) -> StoreResult<Option<GrantClaims>> {
        Ok(self
            .access_tokens
            .lock()
            .map_err(poisoned)?
            .get(&key(token))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::grant;

    #[tokio::test]
    async fn codes_are_single_use() {
        let store = MemoryGrantStore::new();
        store.put_code("abc", grant()).await.unwrap();

        assert!(store.take_code("abc").await.unwrap().is_some());
        assert!(store.take_code("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn access_tokens_can_be_read_repeatedly() {
        let store = MemoryGrantStore::new();
        store.put_access_token("tok", grant()).await.unwrap();

        assert_eq!(
            store.find_access_token("tok").await.unwrap().unwrap().subject,
            "alice"
        );
        assert!(store.find_access_token("tok").await.unwrap().is_some());
        assert!(store.find_access_token("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_dropped_on_insert() {
        let store = MemoryGrantStore::new();
        let expired = GrantClaims {
            expires_at: strategy::now() - 1,
            ..grant()
        };
        for i in 0..100 {
            store
                .put_code(&format!("c{i}"), expired.clone())
                .await
                .unwrap();
            store
                .put_access_token(&format!("t{i}"), expired.clone())
                .await
                .unwrap();
        }

        store.put_code("fresh-code", grant()).await.unwrap();
        store.put_access_token("fresh", grant()).await.unwrap();

        assert_eq!(store.codes.lock().unwrap().len(), 1);
        assert_eq!(store.access_tokens.lock().unwrap().len(), 1);
        assert!(store.find_access_token("t0").await.unwrap().is_none());
        assert!(store.take_code("c0").await.unwrap().is_none());
        assert!(store.find_access_token("fresh").await.unwrap().is_some());
        assert!(store.take_code("fresh-code").await.unwrap().is_some());
    }
}
