use crate::context::outbound::{OutboundMessage, TokenResponse};
use crate::context::{Invocation, RequestBearing, ResponseBearing};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Successful token response (OIDC Core 3.1.3.3).
#[derive(Debug, Default)]
pub struct FormTokenResponse;

impl Action for FormTokenResponse {
    fn name(&self) -> &'static str {
        "form_token_response"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.token_request()?;
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let response = inv.response()?;
        let access_token = response
            .access_token
            .as_ref()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no access token issued"))?;

        let message = TokenResponse {
            access_token: access_token.value.clone(),
            token_type: "Bearer",
            expires_in: (access_token.expires_at - strategy::now()).max(0),
            scope: response
                .scope
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            id_token: response.signed_id_token().map(|t| t.as_str().to_string()),
        };

        inv.outbound = Some(OutboundMessage::Token(message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Scope;
    use crate::context::request::Request;
    use crate::context::response::{IssuedToken, SignedIdToken};
    use crate::test_support::{grant, prepared, token_request};

    #[test]
    fn token_response_carries_id_token_and_scope() {
        let mut inv = prepared(Request::Token(token_request(Some(grant()))));
        let response = inv.response.as_mut().unwrap();
        response.scope = Some(Scope::parse("openid profile"));
        response.access_token = Some(IssuedToken {
            value: "at".into(),
            expires_at: strategy::now() + 600,
            claims: grant(),
        });
        response.set_signed_id_token(SignedIdToken::new("h.p.s".into()));

        FormTokenResponse.execute(&mut inv).unwrap();
        let Some(OutboundMessage::Token(token)) = inv.outbound else {
            panic!("expected token response");
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["scope"], "openid profile");
        assert_eq!(json["id_token"], "h.p.s");
        assert!(token.expires_in > 590 && token.expires_in <= 600);
    }

    #[test]
    fn missing_access_token_is_fatal() {
        let mut inv = prepared(Request::Token(token_request(Some(grant()))));
        assert_eq!(
            FormTokenResponse.execute(&mut inv).unwrap_err().event,
            Event::InvalidProfileContext
        );
    }
}
