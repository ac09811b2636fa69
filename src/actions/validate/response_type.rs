use tracing::{debug, warn};

use crate::context::{Invocation, MetadataBearing, ResponseBearing, ResponseType};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};

/// Checks the effective `response_type` against the client's registered
/// response types. Values are compared as unordered sets. A client that
/// registered none is treated as registered for `code` (RFC 7591 2).
pub struct ValidateResponseType {
    response_type: Lookup<ResponseType>,
}

impl Default for ValidateResponseType {
    fn default() -> Self {
        Self {
            response_type: lookup(strategy::requested_response_type),
        }
    }
}

impl ValidateResponseType {
    pub fn with_lookup(response_type: Lookup<ResponseType>) -> Self {
        Self { response_type }
    }
}

impl Action for ValidateResponseType {
    fn name(&self) -> &'static str {
        "validate_response_type"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.relying_party()?;
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let requested = (self.response_type)(inv)
            .filter(|rt| !rt.is_empty())
            .ok_or_else(|| Abort::new(Event::InvalidMessage, "no response_type in request"))?;

        let registered_types = &inv.client_metadata()?.response_types;
        let registered = if registered_types.is_empty() {
            requested.is_code_only()
        } else {
            registered_types
                .iter()
                .any(|raw| ResponseType::parse(raw) == requested)
        };

        if !registered {
            warn!(response_type = %requested, "response_type not registered for client");
            return Err(Abort::new(
                Event::InvalidResponseType,
                format!("response_type `{requested}` not registered"),
            ));
        }

        debug!(response_type = %requested, "response_type validated");
        inv.response_mut()?.response_type = Some(requested);
        Ok(())
    }
}
