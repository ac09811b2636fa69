use crate::actions::validate::webfinger::ISSUER_REL;
use crate::context::outbound::{OutboundMessage, WebFingerLink, WebFingerResponse};
use crate::context::{Invocation, RequestBearing};
use crate::pipeline::{Abort, Action, Gate};

/// JRD pointing the queried resource at this issuer (OIDC Discovery 2).
#[derive(Debug, Default)]
pub struct FormWebFingerResponse;

impl Action for FormWebFingerResponse {
    fn name(&self) -> &'static str {
        "form_webfinger_response"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.webfinger_request()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let subject = inv.webfinger_request()?.resource.clone();
        inv.outbound = Some(OutboundMessage::WebFinger(WebFingerResponse {
            subject,
            links: vec![WebFingerLink {
                rel: ISSUER_REL.to_string(),
                href: inv.profile.issuer.clone(),
            }],
        }));
        Ok(())
    }
}
