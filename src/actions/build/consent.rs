use tracing::debug;

use crate::context::scope::OFFLINE_ACCESS;
use crate::context::{ConsentContext, Invocation, ResponseBearing};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Gate};

/// Asks the consent subsystem to discard prior consent when `offline_access`
/// was granted or the client demanded `prompt=consent`.
pub struct RevokeConsent {
    prompt: Lookup<String>,
}

impl Default for RevokeConsent {
    fn default() -> Self {
        Self {
            prompt: lookup(strategy::prompt),
        }
    }
}

impl RevokeConsent {
    pub fn with_lookup(prompt: Lookup<String>) -> Self {
        Self { prompt }
    }
}

impl Action for RevokeConsent {
    fn name(&self) -> &'static str {
        "revoke_consent"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let offline = inv
            .response()?
            .scope
            .as_ref()
            .is_some_and(|s| s.contains(OFFLINE_ACCESS));
        let prompted = (self.prompt)(inv)
            .is_some_and(|p| p.split_whitespace().any(|v| v == "consent"));

        if offline || prompted {
            debug!(offline, prompted, "revoking previous consent");
            inv.consent.get_or_insert_with(ConsentContext::default).revoke = true;
        }
        Ok(())
    }
}
