use tracing::{debug, warn};

use crate::context::{Invocation, MetadataBearing, RequestBearing};
use crate::pipeline::{Abort, Action, Event, Gate};

/// Grant type assumed for clients that registered none (RFC 7591 2).
pub const DEFAULT_GRANT_TYPE: &str = "authorization_code";

/// Token endpoint: the presented `grant_type` must be registered for the client.
#[derive(Debug, Default)]
pub struct ValidateGrantType;

impl Action for ValidateGrantType {
    fn name(&self) -> &'static str {
        "validate_grant_type"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.token_request()?;
        inv.relying_party()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let grant_type = inv.token_request()?.grant_type.as_str();
        let registered = &inv.client_metadata()?.grant_types;

        let allowed = if registered.is_empty() {
            grant_type == DEFAULT_GRANT_TYPE
        } else {
            registered.iter().any(|g| g == grant_type)
        };

        if !allowed {
            warn!(grant_type, "grant_type not registered for client");
            return Err(Abort::new(
                Event::InvalidGrantType,
                format!("grant_type `{grant_type}` not registered"),
            ));
        }

        debug!(grant_type, "grant_type validated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::Request;
    use crate::test_support::{client, invocation, token_request};

    fn run(grant_type: &str, registered: Vec<String>) -> Result<(), Abort> {
        let mut request = token_request(None);
        request.grant_type = grant_type.into();
        let mut inv = invocation(Request::Token(request))
            .with_relying_party(client(|m| m.grant_types = registered));
        ValidateGrantType.execute(&mut inv)
    }

    #[test]
    fn registered_grant_type_passes() {
        assert!(run("authorization_code", vec!["authorization_code".into()]).is_ok());
    }

    #[test]
    fn unregistered_grant_type_aborts() {
        let err = run("refresh_token", vec!["authorization_code".into()]).unwrap_err();
        assert_eq!(err.event, Event::InvalidGrantType);
    }

    #[test]
    fn empty_registration_allows_only_authorization_code() {
        assert!(run("authorization_code", vec![]).is_ok());
        assert!(run("client_credentials", vec![]).is_err());
    }

    #[test]
    fn requires_token_request() {
        let inv = invocation(Request::Authentication(
            crate::test_support::authentication_request(),
        ));
        let err = ValidateGrantType.pre_execute(&inv).unwrap_err();
        assert_eq!(err.event, Event::InvalidMessageContext);
    }
}
