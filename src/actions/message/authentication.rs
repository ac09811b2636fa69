use tracing::{debug, warn};

use crate::context::outbound::{AuthenticationResponse, OutboundMessage, ResponseMode};
use crate::context::{Invocation, RequestBearing, ResponseBearing, ResponseType};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Builds the authorization response delivered to the validated redirect
/// URI: query encoding for `code`, fragment encoding otherwise (OAuth 2.0
/// Multiple Response Types 2.1).
#[derive(Debug, Default)]
pub struct FormAuthenticationResponse;

impl FormAuthenticationResponse {
    fn response_mode(requested: Option<&str>, response_type: &ResponseType) -> ResponseMode {
        let default = if response_type.is_code_only() {
            ResponseMode::Query
        } else {
            ResponseMode::Fragment
        };
        match requested.and_then(ResponseMode::parse) {
            // tokens are never placed in the query
            Some(ResponseMode::Query) if !response_type.is_code_only() => {
                warn!("response_mode=query ignored for a response carrying tokens");
                default
            }
            Some(mode) => mode,
            None => default,
        }
    }
}

impl Action for FormAuthenticationResponse {
    fn name(&self) -> &'static str {
        "form_authentication_response"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.authentication_request()?;
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let request = inv.authentication_request()?;
        let response = inv.response()?;

        let redirect_uri = response.redirect_uri.clone().ok_or_else(|| {
            Abort::new(
                Event::InvalidRedirectUri,
                "no validated redirect_uri to deliver the response to",
            )
        })?;
        let response_type = response.response_type.clone().ok_or_else(|| {
            Abort::new(Event::InvalidProfileContext, "response_type was not validated")
        })?;

        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(code) = &response.authorization_code {
            params.push(("code".into(), code.value.clone()));
        }
        if let Some(token) = &response.access_token {
            params.push(("access_token".into(), token.value.clone()));
            params.push(("token_type".into(), "Bearer".into()));
            let expires_in = (token.expires_at - strategy::now()).max(0);
            params.push(("expires_in".into(), expires_in.to_string()));
        }
        if response_type.includes(ResponseType::ID_TOKEN) {
            let id_token = response.signed_id_token().ok_or_else(|| {
                Abort::new(Event::InvalidProfileContext, "ID Token was not signed")
            })?;
            params.push(("id_token".into(), id_token.as_str().to_string()));
        }
        if let Some(state) = &request.state {
            params.push(("state".into(), state.clone()));
        }

        let response_mode = Self::response_mode(request.response_mode.as_deref(), &response_type);
        debug!(
            redirect_uri = %redirect_uri,
            params = params.len(),
            mode = ?response_mode,
            "authentication response formed"
        );

        inv.outbound = Some(OutboundMessage::Authentication(AuthenticationResponse {
            redirect_uri,
            response_mode,
            params,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::Request;
    use crate::context::response::{IssuedToken, SignedIdToken};
    use crate::test_support::{authentication_request, grant, prepared, REDIRECT_URI};

    fn formed(response_type: &str, response_mode: Option<&str>) -> AuthenticationResponse {
        let mut request = authentication_request();
        request.response_type = response_type.into();
        request.response_mode = response_mode.map(str::to_string);
        let mut inv = prepared(Request::Authentication(request));

        let rt = ResponseType::parse(response_type);
        let response = inv.response.as_mut().unwrap();
        response.redirect_uri = Some(REDIRECT_URI.into());
        if rt.includes(ResponseType::CODE) {
            response.authorization_code = Some(IssuedToken {
                value: "the-code".into(),
                expires_at: strategy::now() + 300,
                claims: grant(),
            });
        }
        if rt.includes(ResponseType::TOKEN) {
            response.access_token = Some(IssuedToken {
                value: "the-token".into(),
                expires_at: strategy::now() + 600,
                claims: grant(),
            });
        }
        if rt.includes(ResponseType::ID_TOKEN) {
            response.set_signed_id_token(SignedIdToken::new("h.p.s".into()));
        }
        response.response_type = Some(rt);

        FormAuthenticationResponse.execute(&mut inv).unwrap();
        match inv.outbound {
            Some(OutboundMessage::Authentication(r)) => r,
            other => panic!("unexpected outbound message: {other:?}"),
        }
    }

    #[test]
    fn code_flow_uses_query() {
        let response = formed("code", None);
        assert_eq!(response.response_mode, ResponseMode::Query);
        assert_eq!(
            response.location().unwrap(),
            "https://rp.example/cb?code=the-code&state=xyz"
        );
    }

    #[test]
    fn implicit_flow_uses_fragment() {
        let response = formed("id_token token", None);
        assert_eq!(response.response_mode, ResponseMode::Fragment);
        assert_eq!(response.param("access_token"), Some("the-token"));
        assert_eq!(response.param("token_type"), Some("Bearer"));
        assert_eq!(response.param("id_token"), Some("h.p.s"));
        assert!(response.location().unwrap().starts_with("https://rp.example/cb#"));
    }

    #[test]
    fn query_mode_is_not_honoured_for_tokens() {
        assert_eq!(
            formed("code id_token", Some("query")).response_mode,
            ResponseMode::Fragment
        );
        assert_eq!(formed("code", Some("fragment")).response_mode, ResponseMode::Fragment);
    }

    #[test]
    fn unvalidated_redirect_uri_is_fatal() {
        let mut inv = prepared(Request::Authentication(authentication_request()));
        inv.response.as_mut().unwrap().response_type = Some(ResponseType::parse("code"));
        assert_eq!(
            FormAuthenticationResponse.execute(&mut inv).unwrap_err().event,
            Event::InvalidRedirectUri
        );
        assert!(inv.outbound.is_none());
    }
}
