use tracing::warn;

use crate::context::{Invocation, RequestBearing};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// UserInfo: the presented bearer token must resolve to an unexpired grant
/// carrying the `openid` scope.
#[derive(Debug, Default)]
pub struct ValidateAccessToken;

impl Action for ValidateAccessToken {
    fn name(&self) -> &'static str {
        "validate_access_token"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.userinfo_request()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let token = inv.userinfo_request()?.token.as_ref();

        let detail = match token {
            None => "access token unknown",
            Some(t) if t.is_expired(strategy::now()) => "access token expired",
            Some(t) if !t.scope.contains(crate::context::scope::OPENID) => {
                "access token lacks openid scope"
            }
            Some(_) => return Ok(()),
        };

        warn!(detail, "userinfo access token rejected");
        Err(Abort::new(Event::InvalidToken, detail))
    }
}
