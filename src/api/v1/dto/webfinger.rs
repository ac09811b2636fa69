use serde::Deserialize;

use crate::context::request::WebFingerRequest;

/// `GET /.well-known/webfinger` query (RFC 7033 4.1).
#[derive(Debug, Deserialize)]
pub struct WebFingerParams {
    pub resource: Option<String>,
    pub rel: Option<String>,
}

impl WebFingerParams {
    pub fn into_request(self) -> Result<WebFingerRequest, &'static str> {
        let resource = self
            .resource
            .filter(|r| !r.is_empty())
            .ok_or("resource is required")?;
        Ok(WebFingerRequest {
            resource,
            rel: self.rel,
        })
    }
}
