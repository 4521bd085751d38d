use crate::version::{scheme_for_namespace, Version, VersionScheme};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The package ecosystem found on a filesystem snapshot, e.g. `debian:8`
/// or `nodejs:6.1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NamespaceFields")]
pub struct Namespace {
    pub name: String,
    pub version: Version,
}

impl Namespace {
    /// Builds a namespace. Returns `None` if `name` is empty.
    pub fn new(name: impl Into<String>, version: Version) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return None;
        }
        Some(Self { name, version })
    }

    /// Ordering rules for package versions inside this namespace.
    pub fn version_scheme(&self) -> &'static dyn VersionScheme {
        scheme_for_namespace(&self.name)
    }
}

/// Wire form of [`Namespace`], validated through [`Namespace::new`].
#[derive(Deserialize)]
struct NamespaceFields {
    name: String,
    version: Version,
}

impl TryFrom<NamespaceFields> for Namespace {
    type Error = String;

    fn try_from(fields: NamespaceFields) -> Result<Self, Self::Error> {
        Namespace::new(fields.name, fields.version)
            .ok_or_else(|| "namespace name must not be empty".to_string())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}
