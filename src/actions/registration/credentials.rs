use tracing::{debug, error};
use uuid::Uuid;

use crate::context::Invocation;
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};
use crate::services::signing::hash::generate_token;

/// Assigns the client identifier, issue time and, unless the client
/// authenticates with `none`, a client secret. Runs after
/// `AddTokenEndpointAuthMethod`.
#[derive(Debug, Default)]
pub struct IssueClientCredentials;

impl Action for IssueClientCredentials {
    fn name(&self) -> &'static str {
        "issue_client_credentials"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.registration()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let public = registration.output.token_endpoint_auth_method.as_deref() == Some("none");

        let client_secret = if public {
            None
        } else {
            Some(generate_token().map_err(|e| {
                error!(error = %e, "failed to generate client secret");
                Abort::new(Event::InvalidSecurityConfiguration, e.to_string())
            })?)
        };

        let client_id = Uuid::new_v4().to_string();
        debug!(client_id = %client_id, public, "client credentials issued");

        registration.client_id = Some(client_id);
        registration.client_secret = client_secret;
        registration.issued_at = Some(strategy::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClientMetadata;
    use crate::test_support::registering;

    #[test]
    fn confidential_client_gets_a_secret() {
        let mut inv = registering(ClientMetadata::default());
        inv.registration_mut().unwrap().output.token_endpoint_auth_method =
            Some("client_secret_basic".into());
        IssueClientCredentials.execute(&mut inv).unwrap();

        let registration = inv.registration.unwrap();
        assert!(Uuid::parse_str(registration.client_id.as_deref().unwrap()).is_ok());
        assert_eq!(registration.client_secret.unwrap().len(), 43);
        assert!(registration.issued_at.is_some());
    }

    #[test]
    fn public_client_gets_no_secret() {
        let mut inv = registering(ClientMetadata::default());
        inv.registration_mut().unwrap().output.token_endpoint_auth_method = Some("none".into());
        IssueClientCredentials.execute(&mut inv).unwrap();
        assert!(inv.registration.unwrap().client_secret.is_none());
    }
}
