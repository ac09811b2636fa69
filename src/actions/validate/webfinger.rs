use tracing::warn;

use crate::context::{Invocation, RequestBearing};
use crate::pipeline::{Abort, Action, Event, Gate};

/// Link relation for OpenID Provider issuer discovery (OIDC Discovery 2).
pub const ISSUER_REL: &str = "http://openid.net/specs/connect/1.0/issuer";

#[derive(Debug, Default)]
pub struct ValidateWebFingerRel;

impl Action for ValidateWebFingerRel {
    fn name(&self) -> &'static str {
        "validate_webfinger_rel"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.webfinger_request()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let rel = inv.webfinger_request()?.rel.as_deref();
        if rel != Some(ISSUER_REL) {
            warn!(rel = ?rel, "unsupported webfinger rel");
            return Err(Abort::new(
                Event::InvalidWebFingerRel,
                format!("rel {rel:?} is not the issuer relation"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::{Request, WebFingerRequest};
    use crate::test_support::invocation;

    fn run(rel: Option<&str>) -> Result<(), Abort> {
        let mut inv = invocation(Request::WebFinger(WebFingerRequest {
            resource: "acct:alice@op.example".into(),
            rel: rel.map(str::to_string),
        }));
        ValidateWebFingerRel.execute(&mut inv)
    }

    #[test]
    fn issuer_rel_is_accepted() {
        assert!(run(Some(ISSUER_REL)).is_ok());
    }

    #[test]
    fn other_or_missing_rel_is_rejected() {
        assert_eq!(
            run(Some("http://webfinger.net/rel/avatar")).unwrap_err().event,
            Event::InvalidWebFingerRel
        );
        assert_eq!(run(None).unwrap_err().event, Event::InvalidWebFingerRel);
    }
}
