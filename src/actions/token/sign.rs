use tracing::{debug, warn};

use crate::context::response::SignedIdToken;
use crate::context::{Invocation, MetadataBearing, ResponseBearing};
use crate::pipeline::{Abort, Action, Event, Gate};
use crate::services::signing::sign_claims;

/// Signs the assembled ID Token. Afterwards the response context only exposes
/// the compact serialization.
#[derive(Debug, Default)]
pub struct SignIdToken;

impl Action for SignIdToken {
    fn name(&self) -> &'static str {
        "sign_id_token"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        if inv.response()?.id_token().is_none() {
            return Ok(Gate::Skip);
        }
        let Some(params) = inv.signing.as_ref() else {
            return Err(Abort::new(
                Event::InvalidSecurityConfiguration,
                "no signing parameters for ID Token",
            ));
        };

        let registered = inv
            .client_metadata()
            .ok()
            .and_then(|m| m.id_token_signed_response_alg.as_deref());
        if let Some(alg) = registered.filter(|alg| *alg != params.algorithm()) {
            warn!(
                registered = alg,
                configured = params.algorithm(),
                "client expects a different ID Token signing algorithm"
            );
            return Err(Abort::new(
                Event::InvalidSecurityConfiguration,
                format!("cannot sign ID Token with {alg}"),
            ));
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let Some(params) = inv.signing.clone() else {
            return Err(Abort::new(
                Event::InvalidSecurityConfiguration,
                "no signing parameters for ID Token",
            ));
        };
        let claims = inv
            .response_mut()?
            .take_unsigned_id_token()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no unsigned ID Token"))?;

        match sign_claims(&params, &claims) {
            Ok(compact) => {
                if !inv
                    .response_mut()?
                    .set_signed_id_token(SignedIdToken::new(compact))
                {
                    return Err(Abort::new(
                        Event::InvalidProfileContext,
                        "ID Token already signed",
                    ));
                }
                debug!(sub = %claims.sub, "ID Token signed");
                Ok(())
            }
            Err(e) => {
                inv.response_mut()?.set_id_token(claims);
                Err(Abort::new(Event::InvalidSecurityConfiguration, e.to_string()))
            }
        }
    }
}
