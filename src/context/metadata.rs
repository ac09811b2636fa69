//! Relying-party metadata.
//!
//! `ClientMetadata` is the RFC 7591 / OIDC Dynamic Registration record. It is
//! used both as the registered configuration read by validators and as the
//! input/output pair of the registration flow.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::scope::Scope;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("client metadata field `{0}` has an invalid type")]
    InvalidField(String),
}

/// A human-readable value with optional BCP 47 language-tagged variants,
/// e.g. `client_name` and `client_name#ja-Jpan-JP`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localized(BTreeMap<Option<String>, String>);

impl Localized {
    pub fn plain(value: impl Into<String>) -> Self {
        let mut out = Self::default();
        out.insert(None, value);
        out
    }

    pub fn insert(&mut self, tag: Option<String>, value: impl Into<String>) {
        self.0.insert(tag, value.into());
    }

    /// The untagged value.
    pub fn default_value(&self) -> Option<&str> {
        self.0.get(&None).map(String::as_str)
    }

    pub fn tagged(&self, tag: &str) -> Option<&str> {
        self.0.get(&Some(tag.to_string())).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.0.iter().map(|(k, v)| (k.as_deref(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub redirect_uris: Vec<String>,
    pub response_types: Vec<String>,
    pub grant_types: Vec<String>,
    pub application_type: Option<String>,
    pub contacts: Vec<String>,
    pub client_name: Localized,
    pub logo_uri: Localized,
    pub client_uri: Localized,
    pub policy_uri: Localized,
    pub tos_uri: Localized,
    pub jwks_uri: Option<String>,
    pub sector_identifier_uri: Option<String>,
    pub subject_type: Option<String>,
    pub id_token_signed_response_alg: Option<String>,
    pub userinfo_signed_response_alg: Option<String>,
    pub token_endpoint_auth_method: Option<String>,
    pub scope: Option<String>,
}

impl ClientMetadata {
    /// Registered scope values; empty when the client registered none.
    pub fn registered_scope(&self) -> Scope {
        self.scope.as_deref().map(Scope::parse).unwrap_or_default()
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self, MetadataError> {
        Ok(Self {
            redirect_uris: string_list(map, "redirect_uris")?,
            response_types: string_list(map, "response_types")?,
            grant_types: string_list(map, "grant_types")?,
            application_type: string_field(map, "application_type")?,
            contacts: string_list(map, "contacts")?,
            client_name: localized(map, "client_name")?,
            logo_uri: localized(map, "logo_uri")?,
            client_uri: localized(map, "client_uri")?,
            policy_uri: localized(map, "policy_uri")?,
            tos_uri: localized(map, "tos_uri")?,
            jwks_uri: string_field(map, "jwks_uri")?,
            sector_identifier_uri: string_field(map, "sector_identifier_uri")?,
            subject_type: string_field(map, "subject_type")?,
            id_token_signed_response_alg: string_field(map, "id_token_signed_response_alg")?,
            userinfo_signed_response_alg: string_field(map, "userinfo_signed_response_alg")?,
            token_endpoint_auth_method: string_field(map, "token_endpoint_auth_method")?,
            scope: string_field(map, "scope")?,
        })
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        put_list(&mut map, "redirect_uris", &self.redirect_uris);
        put_list(&mut map, "response_types", &self.response_types);
        put_list(&mut map, "grant_types", &self.grant_types);
        put_opt(&mut map, "application_type", &self.application_type);
        put_list(&mut map, "contacts", &self.contacts);
        put_localized(&mut map, "client_name", &self.client_name);
        put_localized(&mut map, "logo_uri", &self.logo_uri);
        put_localized(&mut map, "client_uri", &self.client_uri);
        put_localized(&mut map, "policy_uri", &self.policy_uri);
        put_localized(&mut map, "tos_uri", &self.tos_uri);
        put_opt(&mut map, "jwks_uri", &self.jwks_uri);
        put_opt(&mut map, "sector_identifier_uri", &self.sector_identifier_uri);
        put_opt(&mut map, "subject_type", &self.subject_type);
        put_opt(
            &mut map,
            "id_token_signed_response_alg",
            &self.id_token_signed_response_alg,
        );
        put_opt(
            &mut map,
            "userinfo_signed_response_alg",
            &self.userinfo_signed_response_alg,
        );
        put_opt(
            &mut map,
            "token_endpoint_auth_method",
            &self.token_endpoint_auth_method,
        );
        put_opt(&mut map, "scope", &self.scope);
        map
    }
}

impl Serialize for ClientMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClientMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        ClientMetadata::from_json_map(&map).map_err(D::Error::custom)
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>, MetadataError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MetadataError::InvalidField(key.to_string())),
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> Result<Vec<String>, MetadataError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| MetadataError::InvalidField(key.to_string()))
            })
            .collect(),
        Some(_) => Err(MetadataError::InvalidField(key.to_string())),
    }
}

fn localized(map: &Map<String, Value>, base: &str) -> Result<Localized, MetadataError> {
    let mut out = Localized::default();
    for (key, value) in map {
        let tag = if key == base {
            None
        } else if let Some(tag) = key.strip_prefix(base).and_then(|r| r.strip_prefix('#')) {
            Some(tag.to_string())
        } else {
            continue;
        };
        let text = value
            .as_str()
            .ok_or_else(|| MetadataError::InvalidField(key.clone()))?;
        out.insert(tag, text);
    }
    Ok(out)
}

fn put_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

fn put_list(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
    }
}

fn put_localized(map: &mut Map<String, Value>, base: &str, values: &Localized) {
    for (tag, value) in values.iter() {
        let key = match tag {
            Some(tag) => format!("{base}#{tag}"),
            None => base.to_string(),
        };
        map.insert(key, Value::String(value.to_string()));
    }
}

/// A registered client: credentials plus the metadata accepted at registration.
#[derive(Debug, Clone)]
pub struct ClientInformation {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub issued_at: i64,
    pub metadata: ClientMetadata,
}

/// Metadata context: the relying party the invocation acts for.
///
/// Resolved once by the host and shared read-only across invocations.
#[derive(Debug, Clone)]
pub struct RelyingPartyContext {
    pub client_id: String,
    pub client: Arc<ClientInformation>,
}

impl RelyingPartyContext {
    pub fn new(client: Arc<ClientInformation>) -> Self {
        Self {
            client_id: client.client_id.clone(),
            client,
        }
    }

    pub fn metadata(&self) -> &ClientMetadata {
        &self.client.metadata
    }
}

/// Registration flow state: the requested metadata and the record being built.
#[derive(Debug, Clone, Default)]
pub struct RegistrationContext {
    pub input: ClientMetadata,
    pub output: ClientMetadata,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub issued_at: Option<i64>,
}

impl RegistrationContext {
    pub fn new(input: ClientMetadata) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }
}
