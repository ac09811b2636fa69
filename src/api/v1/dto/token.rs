/*
 * Responsibility
 * - Token endpoint form body (application/x-www-form-urlencoded)
 */
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    // client_secret_post / public clients
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl TokenForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        match self.grant_type.as_deref() {
            None | Some("") => return Err("grant_type is required"),
            Some("authorization_code") if self.code.as_deref().unwrap_or_default().is_empty() => {
                return Err("code is required");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_code_grant_requires_code() {
        let form = TokenForm {
            grant_type: Some("authorization_code".into()),
            ..TokenForm::default()
        };
        assert_eq!(form.validate(), Err("code is required"));
    }

    #[test]
    fn grant_type_is_required() {
        assert_eq!(TokenForm::default().validate(), Err("grant_type is required"));
    }
}
