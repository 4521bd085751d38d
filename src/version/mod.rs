//! Version strings and their ordering.
//!
//! A [`Version`] is a validated, normalised version string. Ordering is
//! delegated to a [`VersionScheme`], because package ecosystems disagree on
//! how versions sort (Debian's `~`, RPM's `^`, SemVer pre-releases, ...).
//!
//! # Example
//!
//! ```
//! use layerscan::version::{Version, RPM};
//! use std::cmp::Ordering;
//!
//! let a = Version::new("1:2.0-1").unwrap();
//! let b = Version::new("3.0-1").unwrap();
//!
//! // Debian rules by default: the epoch wins.
//! assert_eq!(a.compare(&b), Ordering::Greater);
//! assert_eq!(a.compare_with(&b, &RPM), Ordering::Greater);
//! ```

mod dpkg;
mod range;
mod rpm;
mod scheme;
mod semantic;

pub use dpkg::DpkgScheme;
pub use range::VersionRange;
pub use rpm::RpmScheme;
pub use scheme::{scheme_by_name, scheme_for_namespace, VersionScheme, DPKG, RPM, SEMVER};
pub use semantic::SemverScheme;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Longest accepted version string, in bytes.
pub const MAX_VERSION_LEN: usize = 128;

const MIN_VERSION_STR: &str = "#MINV#";
const MAX_VERSION_STR: &str = "#MAXV#";

/// Error returned by [`Version::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Min,
    Value(String),
    Max,
}

/// A version string with a defined total order.
#[derive(Debug, Clone)]
pub struct Version {
    repr: Repr,
}

impl Version {
    /// Parses and validates a version string.
    ///
    /// Surrounding whitespace is trimmed. The remaining string must be
    /// non-empty, free of control characters and at most
    /// [`MAX_VERSION_LEN`] bytes long. Ecosystem-specific syntax is not
    /// checked; that is left to the [`VersionScheme`] doing the comparison.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidVersion`] when a rule is violated.
    pub fn new(s: &str) -> Result<Self, VersionError> {
        let trimmed = s.trim();
        let invalid = |reason: &str| VersionError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty version string"));
        }
        if trimmed.len() > MAX_VERSION_LEN {
            return Err(invalid(&format!("longer than {} bytes", MAX_VERSION_LEN)));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(invalid("contains a control character"));
        }

        Ok(Self::new_unchecked(trimmed))
    }

    /// Builds a version without validation.
    ///
    /// The caller asserts the string is valid, e.g. a literal in a fixture.
    pub fn new_unchecked(s: &str) -> Self {
        let trimmed = s.trim();
        let repr = match trimmed {
            MIN_VERSION_STR => Repr::Min,
            MAX_VERSION_STR => Repr::Max,
            other => Repr::Value(other.to_string()),
        };
        Self { repr }
    }

    /// A version lower than every other version.
    pub fn min() -> Self {
        Self { repr: Repr::Min }
    }

    /// A version greater than every other version. Used as "not fixed".
    pub fn max() -> Self {
        Self { repr: Repr::Max }
    }

    pub fn is_min(&self) -> bool {
        self.repr == Repr::Min
    }

    pub fn is_max(&self) -> bool {
        self.repr == Repr::Max
    }

    /// Returns the canonical textual form.
    pub fn as_str(&self) -> &str {
        match &self.repr {
            Repr::Min => MIN_VERSION_STR,
            Repr::Max => MAX_VERSION_STR,
            Repr::Value(s) => s,
        }
    }

    /// Compares using the default scheme (Debian rules).
    pub fn compare(&self, other: &Version) -> Ordering {
        self.compare_with(other, &DPKG)
    }

    /// Compares using an explicit scheme.
    pub fn compare_with(&self, other: &Version, scheme: &dyn VersionScheme) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Min, Repr::Min) | (Repr::Max, Repr::Max) => Ordering::Equal,
            (Repr::Min, _) | (_, Repr::Max) => Ordering::Less,
            (_, Repr::Min) | (Repr::Max, _) => Ordering::Greater,
            (Repr::Value(a), Repr::Value(b)) => {
                if a == b {
                    Ordering::Equal
                } else {
                    scheme.compare(a, b)
                }
            }
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::new(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::new(&s).map_err(serde::de::Error::custom)
    }
}
