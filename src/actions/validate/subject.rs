use tracing::{debug, warn};

use crate::context::{Invocation, ResponseBearing};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};

/// When the client asked for a specific subject, the resolved subject must
/// match it. Runs after `SetSubject`.
pub struct ValidateSubject {
    requested: Lookup<String>,
}

impl Default for ValidateSubject {
    fn default() -> Self {
        Self {
            requested: lookup(strategy::requested_subject),
        }
    }
}

impl ValidateSubject {
    pub fn with_lookup(requested: Lookup<String>) -> Self {
        Self { requested }
    }
}

impl Action for ValidateSubject {
    fn name(&self) -> &'static str {
        "validate_subject"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        if (self.requested)(inv).is_none() {
            return Ok(Gate::Skip);
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let requested = (self.requested)(inv);
        let resolved = inv.response()?.subject.as_deref();

        if requested.as_deref() != resolved {
            warn!(
                requested = ?requested,
                resolved = ?resolved,
                "requested subject does not match resolved subject"
            );
            return Err(Abort::new(
                Event::InvalidSubject,
                "requested subject does not match",
            ));
        }

        debug!("requested subject matches");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::{ClaimsRequest, Request};
    use crate::test_support::{authentication_request, prepared};

    fn invocation(requested_sub: Option<&str>, resolved: &str) -> Invocation {
        let mut request = authentication_request();
        request.claims = requested_sub.map(|sub| {
            serde_json::from_value::<ClaimsRequest>(
                serde_json::json!({ "id_token": { "sub": { "value": sub } } }),
            )
            .unwrap()
        });
        let mut inv = prepared(Request::Authentication(request));
        inv.response.as_mut().unwrap().subject = Some(resolved.into());
        inv
    }

    #[test]
    fn skipped_without_requested_subject() {
        let inv = invocation(None, "alice");
        assert_eq!(ValidateSubject::default().pre_execute(&inv).unwrap(), Gate::Skip);
    }

    #[test]
    fn matching_subject_passes() {
        let mut inv = invocation(Some("alice"), "alice");
        let step = ValidateSubject::default();
        assert_eq!(step.pre_execute(&inv).unwrap(), Gate::Run);
        assert!(step.execute(&mut inv).is_ok());
    }

    #[test]
    fn mismatch_aborts() {
        let mut inv = invocation(Some("bob"), "alice");
        let err = ValidateSubject::default().execute(&mut inv).unwrap_err();
        assert_eq!(err.event, Event::InvalidSubject);
    }
}
