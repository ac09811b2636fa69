use crate::context::request::ClaimsRequest;
use crate::context::{Invocation, ResponseBearing};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Gate};

/// Copies the requested claims verbatim for attribute release downstream.
pub struct SetRequestedClaims {
    claims: Lookup<ClaimsRequest>,
}

impl Default for SetRequestedClaims {
    fn default() -> Self {
        Self {
            claims: lookup(strategy::requested_claims),
        }
    }
}

impl Action for SetRequestedClaims {
    fn name(&self) -> &'static str {
        "set_requested_claims"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let claims = (self.claims)(inv);
        inv.response_mut()?.requested_claims = claims;
        Ok(())
    }
}
