use tracing::{debug, warn};

use crate::context::{Invocation, MetadataBearing, ResponseBearing, Scope};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};

/// Narrows the requested scope to the client's registered scope.
///
/// Unregistered values are dropped with a warning. A client without
/// registered scope gets the requested scope unfiltered.
pub struct ValidateScope {
    scope: Lookup<Scope>,
}

impl Default for ValidateScope {
    fn default() -> Self {
        Self {
            scope: lookup(strategy::requested_scope),
        }
    }
}

impl ValidateScope {
    pub fn with_lookup(scope: Lookup<Scope>) -> Self {
        Self { scope }
    }
}

impl Action for ValidateScope {
    fn name(&self) -> &'static str {
        "validate_scope"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.relying_party()?;
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let requested = (self.scope)(inv)
            .ok_or_else(|| Abort::new(Event::InvalidMessageContext, "no requested scope"))?;
        let registered = inv.client_metadata()?.registered_scope();

        let validated = if registered.is_empty() {
            debug!("client has no registered scope, passing requested scope through");
            requested
        } else {
            let dropped = requested.difference(&registered);
            if !dropped.is_empty() {
                warn!(dropped = ?dropped, "removing scope values not registered for client");
            }
            requested.intersection(&registered)
        };

        debug!(scope = %validated, "scope validated");
        inv.response_mut()?.scope = Some(validated);
        Ok(())
    }
}
