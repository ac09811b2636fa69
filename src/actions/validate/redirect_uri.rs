use tracing::{debug, warn};

use crate::context::{Invocation, MetadataBearing, ResponseBearing};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Gate};

/// Stores the requested redirect URI when it is registered for the client.
///
/// A mismatch only logs: nothing is stored and the pipeline continues. Steps
/// that deliver to the redirect URI treat the unset value as invalid.
pub struct ValidateRedirectUri {
    redirect_uri: Lookup<String>,
}

impl Default for ValidateRedirectUri {
    fn default() -> Self {
        Self {
            redirect_uri: lookup(strategy::requested_redirect_uri),
        }
    }
}

impl ValidateRedirectUri {
    pub fn with_lookup(redirect_uri: Lookup<String>) -> Self {
        Self { redirect_uri }
    }
}

impl Action for ValidateRedirectUri {
    fn name(&self) -> &'static str {
        "validate_redirect_uri"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.relying_party()?;
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let Some(requested) = (self.redirect_uri)(inv) else {
            warn!("no redirect_uri in request");
            return Ok(());
        };

        let registered = inv.client_metadata()?.redirect_uris.contains(&requested);
        if !registered {
            warn!(redirect_uri = %requested, "redirect_uri not registered for client");
            return Ok(());
        }

        debug!(redirect_uri = %requested, "redirect_uri validated");
        inv.response_mut()?.redirect_uri = Some(requested);
        Ok(())
    }
}
