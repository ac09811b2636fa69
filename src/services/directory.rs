//! User attribute source consulted for ID Token and UserInfo claims.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse user directory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Attributes keyed by principal name.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, Map<String, Value>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON object of the form `{ "<principal>": { "<claim>": ... } }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let directory = Self::from_json_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            users = directory.users.len(),
            "loaded user directory"
        );
        Ok(directory)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DirectoryError> {
        let users: HashMap<String, Map<String, Value>> = serde_json::from_str(raw)?;
        Ok(Self { users })
    }

    pub fn insert(&mut self, principal: impl Into<String>, attributes: Map<String, Value>) {
        self.users.insert(principal.into(), attributes);
    }

    pub fn attributes(&self, principal: &str) -> Option<&Map<String, Value>> {
        self.users.get(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_users_from_json() {
        let directory = UserDirectory::from_json_str(
            r#"{"alice": {"name": "Alice", "email": "alice@example.com"}}"#,
        )
        .unwrap();

        let alice = directory.attributes("alice").unwrap();
        assert_eq!(alice["email"], "alice@example.com");
        assert!(directory.attributes("bob").is_none());
    }

    #[test]
    fn rejects_non_object_entries() {
        assert!(matches!(
            UserDirectory::from_json_str(r#"{"alice": 1}"#),
            Err(DirectoryError::Parse(_))
        ));
    }
}
