use tracing::warn;
use url::Url;

use crate::context::Invocation;
use crate::pipeline::{Abort, Action, Event, Gate};

fn is_loopback(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "[::1]")
}

/// Checks the form of each requested redirect URI (OIDC Registration 2):
/// absolute and without a fragment. Web clients must use https on a
/// non-loopback host; native clients may use custom schemes or http on
/// loopback only. Runs after `AddApplicationType`.
#[derive(Debug, Default)]
pub struct CheckRedirectUris;

impl CheckRedirectUris {
    fn check(uri: &str, native: bool) -> Result<(), String> {
        let url = Url::parse(uri).map_err(|_| "not an absolute URI".to_string())?;
        if url.fragment().is_some() {
            return Err("must not contain a fragment".into());
        }

        let loopback = url.host_str().is_some_and(is_loopback);
        match (native, url.scheme()) {
            (false, "https") if loopback => Err("web clients must not use a loopback host".into()),
            (false, "https") => Ok(()),
            (false, _) => Err("web clients must use https".into()),
            (true, "http") if !loopback => Err("native clients may use http on loopback only".into()),
            (true, _) => Ok(()),
        }
    }
}

impl Action for CheckRedirectUris {
    fn name(&self) -> &'static str {
        "check_redirect_uris"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.registration()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let registration = inv.registration()?;
        let native = registration.output.application_type.as_deref() == Some("native");

        for uri in &registration.input.redirect_uris {
            if let Err(reason) = Self::check(uri, native) {
                warn!(redirect_uri = %uri, reason = %reason, "redirect_uri rejected");
                return Err(Abort::new(
                    Event::InvalidRedirectUri,
                    format!("{uri}: {reason}"),
                ));
            }
        }
        Ok(())
    }
}
