/*
 * Responsibility
 * - Process-wide collaborators shared by the handlers (stores, directory, signing key)
 * - Binding of an inbound request to a fresh Invocation
 */
use std::sync::Arc;

use crate::context::{Invocation, ProfileConfiguration, Request, SigningParameters};
use crate::flows::Pipelines;
use crate::services::clients::{ClientStore, MemoryClientStore};
use crate::services::directory::UserDirectory;
use crate::services::grants::{GrantStore, MemoryGrantStore};

#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<ProfileConfiguration>,
    pub signing: Option<SigningParameters>,
    pub clients: Arc<dyn ClientStore>,
    pub grants: Arc<dyn GrantStore>,
    pub directory: Arc<UserDirectory>,
    pub pipelines: Pipelines,
}

impl AppState {
    /// State backed by the in-memory stores.
    pub fn new(
        profile: ProfileConfiguration,
        signing: Option<SigningParameters>,
        directory: UserDirectory,
    ) -> Self {
        Self {
            profile: Arc::new(profile),
            signing,
            clients: Arc::new(MemoryClientStore::new()),
            grants: Arc::new(MemoryGrantStore::new()),
            directory: Arc::new(directory),
            pipelines: Pipelines::standard(),
        }
    }

    pub fn with_clients(mut self, clients: Arc<dyn ClientStore>) -> Self {
        self.clients = clients;
        self
    }

    /// A fresh invocation carrying the provider profile and signing material.
    pub fn invocation(&self, request: Request) -> Invocation {
        Invocation::new(self.profile.clone(), request).with_signing(self.signing.clone())
    }
}
