use tracing::info;

use crate::context::outbound::{OutboundMessage, RegistrationResponse};
use crate::context::Invocation;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Client information response (RFC 7591 3.2.1).
#[derive(Debug, Default)]
pub struct FormRegistrationResponse;

impl Action for FormRegistrationResponse {
    fn name(&self) -> &'static str {
        "form_registration_response"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.registration()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration()?;
        let (Some(client_id), Some(issued_at)) =
            (registration.client_id.clone(), registration.issued_at)
        else {
            return Err(Abort::new(
                Event::InvalidProfileContext,
                "client credentials were not issued",
            ));
        };

        info!(client_id = %client_id, "client registered");
        inv.outbound = Some(OutboundMessage::Registration(RegistrationResponse {
            client_id,
            client_secret: registration.client_secret.clone(),
            client_id_issued_at: issued_at,
            metadata: registration.output.clone(),
        }));
        Ok(())
    }
}
