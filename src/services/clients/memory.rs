use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::context::ClientInformation;
use crate::services::clients::store::{ClientStore, StoreError, StoreResult};

/// Process-local client registry.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<String, Arc<ClientInformation>>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, client_id: &str) -> StoreResult<Option<Arc<ClientInformation>>> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StoreError::Backend("client registry lock poisoned".into()))?;
        Ok(clients.get(client_id).cloned())
    }

    async fn insert(&self, client: ClientInformation) -> StoreResult<Arc<ClientInformation>> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StoreError::Backend("client registry lock poisoned".into()))?;

        if clients.contains_key(&client.client_id) {
            return Err(StoreError::Duplicate(client.client_id));
        }

        debug!(client_id = %client.client_id, "registering client");
        let client = Arc::new(client);
        clients.insert(client.client_id.clone(), client.clone());
        Ok(client)
    }
}
