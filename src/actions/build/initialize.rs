use tracing::debug;

use crate::context::{Invocation, ResponseContext};
use crate::pipeline::{Abort, Action};

/// Creates the response context every builder and signer writes into.
#[derive(Debug, Default)]
pub struct InitializeResponseContext;

impl Action for InitializeResponseContext {
    fn name(&self) -> &'static str {
        "initialize_response_context"
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        if inv.response.is_none() {
            debug!("creating response context");
            inv.response = Some(ResponseContext::new());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::Request;
    use crate::test_support::{authentication_request, invocation};

    #[test]
    fn creates_once() {
        let mut inv = invocation(Request::Authentication(authentication_request()));
        InitializeResponseContext.execute(&mut inv).unwrap();
        inv.response.as_mut().unwrap().subject = Some("alice".into());

        InitializeResponseContext.execute(&mut inv).unwrap();
        assert_eq!(inv.response.unwrap().subject.as_deref(), Some("alice"));
    }
}
