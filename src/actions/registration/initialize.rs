use tracing::debug;

use crate::context::{Invocation, RegistrationContext, RequestBearing};
use crate::pipeline::{Abort, Action, Gate};

/// Seeds the registration context with the requested metadata and an empty
/// output record.
#[derive(Debug, Default)]
pub struct InitializeRegistrationContext;

impl Action for InitializeRegistrationContext {
    fn name(&self) -> &'static str {
        "initialize_registration_context"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.registration_request()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let input = inv.registration_request()?.metadata.clone();
        debug!(redirect_uris = input.redirect_uris.len(), "registration context created");
        inv.registration = Some(RegistrationContext::new(input));
        Ok(())
    }
}
