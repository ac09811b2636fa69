//! Builders that copy or default a single descriptive field.

use tracing::{debug, warn};
use url::Url;

use crate::context::metadata::Localized;
use crate::context::{ClientMetadata, Invocation};
use crate::pipeline::{Abort, Action, Event, Gate};

pub const DEFAULT_APPLICATION_TYPE: &str = "web";

fn require_registration(inv: &Invocation) -> Result<Gate, Abort> {
    inv.registration()?;
    Ok(Gate::Run)
}

#[derive(Debug, Default)]
pub struct AddApplicationType;

impl Action for AddApplicationType {
    fn name(&self) -> &'static str {
        "add_application_type"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let application_type = match registration.input.application_type.as_deref() {
            None => {
                debug!("application_type absent, defaulting to web");
                DEFAULT_APPLICATION_TYPE
            }
            Some(t @ ("web" | "native")) => t,
            Some(other) => {
                warn!(application_type = other, "unknown application_type");
                return Err(Abort::new(
                    Event::InvalidMessage,
                    format!("unknown application_type `{other}`"),
                ));
            }
        };
        registration.output.application_type = Some(application_type.to_string());
        Ok(())
    }
}

/// Copies `client_name` including its language-tagged variants.
#[derive(Debug, Default)]
pub struct AddClientName;

impl Action for AddClientName {
    fn name(&self) -> &'static str {
        "add_client_name"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        registration.output.client_name = registration.input.client_name.clone();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct AddContacts;

impl Action for AddContacts {
    fn name(&self) -> &'static str {
        "add_contacts"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        registration.output.contacts = registration
            .input
            .contacts
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Ok(())
    }
}

/// Language-taggable URI fields of the registration metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizedUri {
    Logo,
    Client,
    Policy,
    TermsOfService,
}

impl LocalizedUri {
    pub fn field_name(&self) -> &'static str {
        match self {
            LocalizedUri::Logo => "logo_uri",
            LocalizedUri::Client => "client_uri",
            LocalizedUri::Policy => "policy_uri",
            LocalizedUri::TermsOfService => "tos_uri",
        }
    }

    fn get(self, metadata: &ClientMetadata) -> &Localized {
        match self {
            LocalizedUri::Logo => &metadata.logo_uri,
            LocalizedUri::Client => &metadata.client_uri,
            LocalizedUri::Policy => &metadata.policy_uri,
            LocalizedUri::TermsOfService => &metadata.tos_uri,
        }
    }

    fn get_mut(self, metadata: &mut ClientMetadata) -> &mut Localized {
        match self {
            LocalizedUri::Logo => &mut metadata.logo_uri,
            LocalizedUri::Client => &mut metadata.client_uri,
            LocalizedUri::Policy => &mut metadata.policy_uri,
            LocalizedUri::TermsOfService => &mut metadata.tos_uri,
        }
    }
}

/// Copies every language variant of one URI field. Each value must be an
/// absolute URL.
#[derive(Debug)]
pub struct AddLocalizedUri {
    field: LocalizedUri,
}

impl AddLocalizedUri {
    pub fn new(field: LocalizedUri) -> Self {
        Self { field }
    }
}

impl Action for AddLocalizedUri {
    fn name(&self) -> &'static str {
        match self.field {
            LocalizedUri::Logo => "add_logo_uri",
            LocalizedUri::Client => "add_client_uri",
            LocalizedUri::Policy => "add_policy_uri",
            LocalizedUri::TermsOfService => "add_tos_uri",
        }
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        let values = self.field.get(&registration.input).clone();

        for (tag, value) in values.iter() {
            if Url::parse(value).is_err() {
                warn!(field = self.field.field_name(), tag = ?tag, "not an absolute URL");
                return Err(Abort::new(
                    Event::InvalidMessage,
                    format!("{} is not an absolute URL", self.field.field_name()),
                ));
            }
        }

        *self.field.get_mut(&mut registration.output) = values;
        Ok(())
    }
}

/// Copies the mandatory `redirect_uris`. Their form is checked by
/// `CheckRedirectUris`.
#[derive(Debug, Default)]
pub struct AddRedirectUris;

impl Action for AddRedirectUris {
    fn name(&self) -> &'static str {
        "add_redirect_uris"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        require_registration(inv)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration_mut()?;
        if registration.input.redirect_uris.is_empty() {
            return Err(Abort::new(
                Event::InvalidRedirectUri,
                "redirect_uris is required",
            ));
        }
        registration.output.redirect_uris = registration.input.redirect_uris.clone();
        Ok(())
    }
}
