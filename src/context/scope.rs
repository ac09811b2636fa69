//! Space-delimited parameter sets (`scope`, `response_type`).
//!
//! Both parameters are unordered sets on the wire, so equality and membership
//! ignore token order and duplicates.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const OPENID: &str = "openid";
pub const OFFLINE_ACCESS: &str = "offline_access";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(BTreeSet<String>);

impl Scope {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Values present in both sets.
    pub fn intersection(&self, other: &Scope) -> Scope {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Values present in `self` but not in `other`.
    pub fn difference(&self, other: &Scope) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
        f.write_str(&joined)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| s.as_ref().to_string()).collect())
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Scope::parse(&raw))
    }
}

/// A `response_type` value such as `code` or `code id_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseType(BTreeSet<String>);

impl ResponseType {
    pub const CODE: &'static str = "code";
    pub const ID_TOKEN: &'static str = "id_token";
    pub const TOKEN: &'static str = "token";

    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn includes(&self, part: &str) -> bool {
        self.0.contains(part)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pure authorization code flow (`response_type=code`).
    pub fn is_code_only(&self) -> bool {
        self.0.len() == 1 && self.includes(Self::CODE)
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
        f.write_str(&joined)
    }
}
