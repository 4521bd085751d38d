//! Namespace detectors.
//!
//! This module provides the [`NamespaceDetector`] trait, the
//! [`DetectorRegistry`] that runs detectors over a layer, and one
//! implementation per supported ecosystem.
//!
//! # Available Detectors
//!
//! | Name | Detector | Evidence |
//! |------|----------|----------|
//! | `nodejs` | [`NodejsDetector`] | dpkg status, apk installed index, RPM database |
//! | `alpine-release` | [`AlpineReleaseDetector`] | `etc/alpine-release` |
//! | `redhat-release` | [`RedhatReleaseDetector`] | `etc/{oracle,centos,redhat,system}-release` |
//! | `os-release` | [`OsReleaseDetector`] | `etc/os-release`, `usr/lib/os-release` |
//! | `lsb-release` | [`LsbReleaseDetector`] | `etc/lsb-release` |
//! | `debian-version` | [`DebianVersionDetector`] | `etc/debian_version` |
//!
//! # Example
//!
//! ```
//! use layerscan::detector::{DetectorRegistry, LayerFiles};
//!
//! let registry = DetectorRegistry::with_builtins();
//!
//! let mut files = LayerFiles::new();
//! files.insert("etc/alpine-release".to_string(), b"3.4.6\n".to_vec());
//!
//! let detected = registry.detect(&files).unwrap();
//! assert_eq!(detected.namespace.to_string(), "alpine:v3.4");
//! assert_eq!(detected.detector, "alpine-release");
//! ```

mod alpine_release;
mod debian_version;
pub mod harness;
mod lsb_release;
mod nodejs;
mod os_release;
mod redhat_release;
mod registry;
mod rpm;

pub use alpine_release::AlpineReleaseDetector;
pub use debian_version::DebianVersionDetector;
pub use lsb_release::LsbReleaseDetector;
pub use nodejs::NodejsDetector;
pub use os_release::OsReleaseDetector;
pub use redhat_release::RedhatReleaseDetector;
pub use registry::{
    builtin_detector, default_registry, DetectedNamespace, DetectorRegistry, RegistryError,
    RequiredFiles, BUILTIN_DETECTORS,
};
pub use rpm::{RpmQuery, SystemRpm};

use crate::model::Namespace;
use crate::version::{Version, VersionError};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Raw file contents of a snapshot, keyed by path relative to the root
/// with no leading slash (e.g. `var/lib/dpkg/status`).
pub type LayerFiles = BTreeMap<String, Vec<u8>>;

/// Result of running one detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Matched(Namespace),
    NoMatch,
}

impl Detection {
    pub fn is_match(&self) -> bool {
        matches!(self, Detection::Matched(_))
    }

    pub fn into_option(self) -> Option<Namespace> {
        match self {
            Detection::Matched(ns) => Some(ns),
            Detection::NoMatch => None,
        }
    }
}

impl From<Option<Namespace>> for Detection {
    fn from(ns: Option<Namespace>) -> Self {
        match ns {
            Some(ns) => Detection::Matched(ns),
            None => Detection::NoMatch,
        }
    }
}

/// Failures inside a detector. These never leave [`NamespaceDetector::detect`];
/// they are logged and turned into [`Detection::NoMatch`].
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("io error: {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("package query failed: {0}")]
    Query(String),

    #[error("ambiguous identity in {path}: expected {expected}, found {found}")]
    AmbiguousIdentity {
        path: String,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),
}

/// Identifies the package ecosystem of a snapshot from raw file contents.
///
/// Implementations are stateless and must not fail: a missing file, a
/// parse error or a failing external tool all resolve to
/// [`Detection::NoMatch`].
pub trait NamespaceDetector: Send + Sync {
    /// Returns the detector's registry name.
    fn name(&self) -> &'static str;

    /// Anchored regular expressions for the paths `detect` reads.
    ///
    /// The layer loader extracts only files matching one of these.
    fn required_files(&self) -> &[&'static str];

    /// Inspects the files and returns at most one namespace.
    fn detect(&self, files: &LayerFiles) -> Detection;
}

/// Returns the contents of `path` as text, if present.
pub(crate) fn file_text<'a>(files: &'a LayerFiles, path: &str) -> Option<Cow<'a, str>> {
    files.get(path).map(|bytes| String::from_utf8_lossy(bytes))
}

/// Builds a namespace, logging and discarding an invalid version.
pub(crate) fn namespace(detector: &str, name: &str, version: &str) -> Detection {
    match Version::new(version) {
        Ok(version) => Namespace::new(name, version).into(),
        Err(err) => {
            tracing::warn!(detector, error = %DetectionError::from(err), "discarding namespace");
            Detection::NoMatch
        }
    }
}

/// Parses `KEY=VALUE` lines as found in os-release and lsb-release files.
///
/// Blank lines and comments are skipped and surrounding quotes removed.
pub(crate) fn parse_key_values(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
