use tracing::debug;

use crate::context::{Invocation, ResponseBearing};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Gate};

/// Sets the expiration instant to now plus the resolved lifetime. A missing
/// or non-positive lifetime, or one that overflows the instant, leaves it unset.
pub struct SetExpiration {
    lifetime: Lookup<i64>,
}

impl Default for SetExpiration {
    fn default() -> Self {
        Self {
            lifetime: lookup(strategy::id_token_lifetime),
        }
    }
}

impl SetExpiration {
    pub fn with_lookup(lifetime: Lookup<i64>) -> Self {
        Self { lifetime }
    }
}

impl Action for SetExpiration {
    fn name(&self) -> &'static str {
        "set_expiration"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let resolved = (self.lifetime)(inv)
            .filter(|l| *l > 0)
            .and_then(|l| strategy::now().checked_add(l).map(|exp| (l, exp)));
        match resolved {
            Some((lifetime, exp)) => {
                debug!(lifetime, exp, "expiration set");
                inv.response_mut()?.expiration = Some(exp);
            }
            None => debug!("no usable lifetime resolved, expiration left unset"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::Request;
    use crate::test_support::{authentication_request, prepared};

    fn expiration(step: SetExpiration) -> Option<i64> {
        let mut inv = prepared(Request::Authentication(authentication_request()));
        step.execute(&mut inv).unwrap();
        inv.response.unwrap().expiration
    }

    #[test]
    fn uses_configured_id_token_lifetime() {
        let before = strategy::now();
        let exp = expiration(SetExpiration::default()).unwrap();
        assert!(exp >= before + 3600 && exp <= strategy::now() + 3600);
    }

    #[test]
    fn non_positive_or_missing_lifetime_leaves_unset() {
        assert!(expiration(SetExpiration::with_lookup(lookup(|_| Some(0)))).is_none());
        assert!(expiration(SetExpiration::with_lookup(lookup(|_| Some(-5)))).is_none());
        assert!(expiration(SetExpiration::with_lookup(lookup(|_| None))).is_none());
    }

    #[test]
    fn overflowing_lifetime_leaves_unset() {
        assert!(expiration(SetExpiration::with_lookup(lookup(|_| Some(i64::MAX)))).is_none());
    }
}
