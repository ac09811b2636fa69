//! Builders that negotiate a registration field against what the provider
//! supports.

use std::collections::BTreeSet;

use tracing::{debug, warn};
use url::Url;

use crate::context::scope::OPENID;
use crate::context::{Invocation, ResponseType, SubjectType};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};

pub const DEFAULT_RESPONSE_TYPE: &str = "code";
pub const DEFAULT_AUTH_METHOD: &str = "client_secret_basic";
pub const SUPPORTED_GRANT_TYPES: &[&str] = &["authorization_code", "implicit", "refresh_token"];

fn invalid(detail: String) -> Abort {
    warn!(detail = %detail, "client metadata rejected");
    Abort::new(Event::InvalidMessage, detail)
}

fn require_registration(inv: &Invocation) -> Result<Gate, Abort> {
    inv.registration()?;
    Ok(Gate::Run)
}

/// Keeps the requested response types the provider supports. Defaults to
/// `code`; nothing supported is fatal.
#[derive(Debug, Default)]
pub struct AddResponseTypes;

impl Action for AddResponseTypes {
    fn name(&self) -> &'static str {
        "add_response_types"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let supported: Vec<ResponseType> = inv
            .profile
            .supported_response_types
            .iter()
            .map(|raw| ResponseType::parse(raw))
            .collect();
        let registration = inv.registration_mut()?;

        if registration.input.response_types.is_empty() {
            debug!("response_types absent, defaulting to code");
            registration.output.response_types = vec![DEFAULT_RESPONSE_TYPE.to_string()];
            return Ok(());
        }

        let (accepted, dropped): (Vec<_>, Vec<_>) = registration
            .input
            .response_types
            .iter()
            .cloned()
            .partition(|raw| supported.contains(&ResponseType::parse(raw)));

        if !dropped.is_empty() {
            warn!(dropped = ?dropped, "removing unsupported response_types");
        }
        if accepted.is_empty() {
            return Err(invalid("none of the requested response_types is supported".into()));
        }
        registration.output.response_types = accepted;
        Ok(())
    }
}

/// Grant types needed by the accepted response types (OIDC Registration 2).
fn required_grant_types(response_types: &[String]) -> BTreeSet<&'static str> {
    let mut required = BTreeSet::new();
    for rt in response_types.iter().map(|raw| ResponseType::parse(raw)) {
        if rt.includes(ResponseType::CODE) {
            required.insert("authorization_code");
        }
        if rt.includes(ResponseType::TOKEN) || rt.includes(ResponseType::ID_TOKEN) {
            required.insert("implicit");
        }
    }
    required
}

/// Keeps supported grant types and adds those the response types imply.
/// Runs after `AddResponseTypes`.
#[derive(Debug, Default)]
pub struct AddGrantTypes;

impl Action for AddGrantTypes {
    fn name(&self) -> &'static str {
        "add_grant_types"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let required = required_grant_types(&registration.output.response_types);

        let mut grant_types: Vec<String> = Vec::new();
        for requested in &registration.input.grant_types {
            if !SUPPORTED_GRANT_TYPES.contains(&requested.as_str()) {
                return Err(invalid(format!("grant_type `{requested}` is not supported")));
            }
            if !grant_types.contains(requested) {
                grant_types.push(requested.clone());
            }
        }
        for missing in required {
            if !grant_types.iter().any(|g| g == missing) {
                debug!(grant_type = missing, "adding grant_type implied by response_types");
                grant_types.push(missing.to_string());
            }
        }

        registration.output.grant_types = grant_types;
        Ok(())
    }
}

/// Copies `scope`, defaulting to `openid`.
#[derive(Debug, Default)]
pub struct AddScope;

impl Action for AddScope {
    fn name(&self) -> &'static str {
        "add_scope"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let scope = registration.input.registered_scope();
        registration.output.scope = Some(if scope.is_empty() {
            debug!("scope absent, defaulting to openid");
            OPENID.to_string()
        } else {
            scope.to_string()
        });
        Ok(())
    }
}

/// Copies `subject_type`, defaulting to `public`. Pairwise clients whose
/// redirect URIs span several hosts must register a `sector_identifier_uri`.
#[derive(Debug, Default)]
pub struct AddSubjectType;

impl Action for AddSubjectType {
    fn name(&self) -> &'static str {
        "add_subject_type"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let subject_type = match registration.input.subject_type.as_deref() {
            None => SubjectType::Public,
            Some(raw) => SubjectType::parse(raw)
                .ok_or_else(|| invalid(format!("unknown subject_type `{raw}`")))?,
        };

        if subject_type == SubjectType::Pairwise {
            match registration.input.sector_identifier_uri.as_deref() {
                Some(uri) => {
                    let https = Url::parse(uri).is_ok_and(|u| u.scheme() == "https");
                    if !https {
                        return Err(invalid("sector_identifier_uri must be an https URL".into()));
                    }
                    registration.output.sector_identifier_uri = Some(uri.to_string());
                }
                None => {
                    let hosts: BTreeSet<String> = registration
                        .input
                        .redirect_uris
                        .iter()
                        .filter_map(|u| Url::parse(u).ok()?.host_str().map(str::to_string))
                        .collect();
                    if hosts.len() > 1 {
                        return Err(invalid(
                            "pairwise client with several redirect hosts needs sector_identifier_uri"
                                .into(),
                        ));
                    }
                }
            }
        }

        registration.output.subject_type = Some(subject_type.as_str().to_string());
        Ok(())
    }
}

/// Copies `token_endpoint_auth_method`, defaulting to `client_secret_basic`.
/// The method must be enabled on this provider.
pub struct AddTokenEndpointAuthMethod {
    enabled: Lookup<Vec<String>>,
}

impl Default for AddTokenEndpointAuthMethod {
    fn default() -> Self {
        Self {
            enabled: lookup(strategy::enabled_auth_methods),
        }
    }
}

impl AddTokenEndpointAuthMethod {
    pub fn with_lookup(enabled: Lookup<Vec<String>>) -> Self {
        Self { enabled }
    }
}

impl Action for AddTokenEndpointAuthMethod {
    fn name(&self) -> &'static str {
        "add_token_endpoint_auth_method"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let enabled = (self.enabled)(inv).unwrap_or_default();
        let registration = inv.registration_mut()?;
        let method = registration
            .input
            .token_endpoint_auth_method
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTH_METHOD.to_string());

        if !enabled.contains(&method) {
            return Err(invalid(format!(
                "token_endpoint_auth_method `{method}` is not enabled"
            )));
        }
        registration.output.token_endpoint_auth_method = Some(method);
        Ok(())
    }
}

/// Copies the ID Token and UserInfo signing algorithms when the provider can
/// sign with them.
#[derive(Debug, Default)]
pub struct AddSigningAlgorithms;

impl Action for AddSigningAlgorithms {
    fn name(&self) -> &'static str {
        "add_signing_algorithms"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let supported = inv.profile.supported_signing_algorithms.clone();
        let registration = inv.registration_mut()?;

        for (field, value) in [
            (
                "id_token_signed_response_alg",
                &registration.input.id_token_signed_response_alg,
            ),
            (
                "userinfo_signed_response_alg",
                &registration.input.userinfo_signed_response_alg,
            ),
        ] {
            if let Some(alg) = value
                && !supported.contains(alg)
            {
                return Err(invalid(format!("{field} `{alg}` is not supported")));
            }
        }

        registration.output.id_token_signed_response_alg =
            registration.input.id_token_signed_response_alg.clone();
        registration.output.userinfo_signed_response_alg =
            registration.input.userinfo_signed_response_alg.clone();
        registration.output.jwks_uri = registration.input.jwks_uri.clone();
        Ok(())
    }
}
