use tracing::{debug, warn};

use crate::context::{Invocation, MetadataBearing, RequestBearing};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Checks the authorization code being redeemed (RFC 6749 4.1.3): it must be
/// known and unexpired, issued to the same client, and `redirect_uri` must
/// repeat the value the code was issued for.
#[derive(Debug, Default)]
pub struct ValidateAuthorizationGrant;

fn invalid(detail: &str) -> Abort {
    warn!(detail, "authorization grant rejected");
    Abort::new(Event::InvalidGrant, detail)
}

impl Action for ValidateAuthorizationGrant {
    fn name(&self) -> &'static str {
        "validate_authorization_grant"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.token_request()?;
        inv.relying_party()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let request = inv.token_request()?;
        let grant = request
            .grant
            .as_ref()
            .ok_or_else(|| invalid("authorization code unknown or already used"))?;

        if grant.is_expired(strategy::now()) {
            return Err(invalid("authorization code expired"));
        }
        if grant.client_id != inv.relying_party()?.client_id {
            return Err(invalid("authorization code issued to another client"));
        }
        if grant.redirect_uri.is_some() && grant.redirect_uri != request.redirect_uri {
            return Err(invalid("redirect_uri does not match authorization request"));
        }

        debug!(subject = %grant.subject, "authorization grant validated");
        Ok(())
    }
}
