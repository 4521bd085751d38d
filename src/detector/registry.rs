//! Detector registry.
//!
//! The [`DetectorRegistry`] holds named detectors in registration order,
//! aggregates the files they need, and runs them over a layer. It is
//! built once and then only read, so a single instance can be shared by
//! concurrent scans.

use super::{
    AlpineReleaseDetector, DebianVersionDetector, Detection, LayerFiles, LsbReleaseDetector,
    NamespaceDetector, NodejsDetector, OsReleaseDetector, RedhatReleaseDetector, SystemRpm,
};
use crate::model::Namespace;
use regex::RegexSet;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Built-in detector names, in default priority order.
pub const BUILTIN_DETECTORS: &[&str] = &[
    "nodejs",
    "alpine-release",
    "redhat-release",
    "os-release",
    "lsb-release",
    "debian-version",
];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("detector '{0}' is already registered")]
    Duplicate(String),

    #[error(
        "unknown detector '{name}', expected one of: {list}",
        name = .0,
        list = BUILTIN_DETECTORS.join(", ")
    )]
    Unknown(String),

    #[error("invalid required-file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// A namespace together with the detector that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedNamespace {
    pub namespace: Namespace,
    pub detector: String,
}

/// Compiled union of every registered detector's required-file patterns.
#[derive(Debug, Clone)]
pub struct RequiredFiles {
    set: RegexSet,
    /// Literal leading part of each pattern; empty when unanchored.
    prefixes: Vec<String>,
}

impl RequiredFiles {
    /// Returns true if some detector needs the file at `path`.
    ///
    /// `path` is relative to the layer root, without a leading slash.
    pub fn is_required(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// Returns true if a required file could live below the directory at
    /// `dir` (relative, no leading or trailing slash).
    pub fn may_contain(&self, dir: &str) -> bool {
        let dir = format!("{}/", dir);
        self.prefixes
            .iter()
            .any(|prefix| prefix.starts_with(&dir) || dir.starts_with(prefix.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        self.set.patterns()
    }
}

/// Returns the literal text an anchored pattern must start with.
fn literal_prefix(pattern: &str) -> String {
    let Some(rest) = pattern.strip_prefix('^') else {
        return String::new();
    };
    rest.chars()
        .take_while(|c| !"\\.+*?()|[]{}^$".contains(*c))
        .collect()
}

/// Ordered collection of named namespace detectors.
pub struct DetectorRegistry {
    detectors: Vec<(String, Box<dyn NamespaceDetector>)>,
}

impl DetectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Creates a registry with every built-in detector in default order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_DETECTORS {
            if let Some(detector) = builtin_detector(name, SystemRpm::DEFAULT_BINARY) {
                registry.register(name, detector);
            }
        }
        registry
    }

    /// Creates a registry with the named built-in detectors, in the given
    /// order. RPM databases are queried with `rpm_binary`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown name or a name listed twice.
    pub fn from_names<S: AsRef<str>>(names: &[S], rpm_binary: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            let detector = builtin_detector(name, rpm_binary)
                .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
            registry.try_register(name, detector)?;
        }
        Ok(registry)
    }

    /// Registers a detector under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered. Registering twice is a
    /// programming error; use [`try_register`](Self::try_register) to get
    /// an error value instead.
    #[track_caller]
    pub fn register(&mut self, name: &str, detector: Box<dyn NamespaceDetector>) {
        if let Err(err) = self.try_register(name, detector) {
            panic!("{}", err);
        }
    }

    /// Registers a detector, failing if `name` is taken.
    pub fn try_register(
        &mut self,
        name: &str,
        detector: Box<dyn NamespaceDetector>,
    ) -> Result<(), RegistryError> {
        if self.get(name).is_some() {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.detectors.push((name.to_string(), detector));
        Ok(())
    }

    /// Get a detector by name.
    pub fn get(&self, name: &str) -> Option<&dyn NamespaceDetector> {
        self.detectors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_ref())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.detectors.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, detector)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn NamespaceDetector)> {
        self.detectors.iter().map(|(n, d)| (n.as_str(), d.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Union of all detectors' required-file patterns, sorted and deduplicated.
    pub fn required_files(&self) -> Vec<String> {
        self.detectors
            .iter()
            .flat_map(|(_, d)| d.required_files().iter().map(|p| p.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Compiles [`required_files`](Self::required_files) into a matcher.
    pub fn required_file_matcher(&self) -> Result<RequiredFiles, RegistryError> {
        let patterns = self.required_files();
        let set = RegexSet::new(&patterns).map_err(|source| RegistryError::Pattern {
            pattern: patterns.join(" | "),
            source,
        })?;
        let prefixes = patterns.iter().map(|p| literal_prefix(p)).collect();
        Ok(RequiredFiles { set, prefixes })
    }

    /// Runs every detector in registration order and returns the first match.
    ///
    /// A detector that panics is logged and skipped; it never stops the
    /// remaining detectors.
    pub fn detect(&self, files: &LayerFiles) -> Option<DetectedNamespace> {
        for (name, detector) in &self.detectors {
            match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(files))) {
                Ok(Detection::Matched(namespace)) => {
                    debug!(detector = %name, namespace = %namespace, "namespace detected");
                    return Some(DetectedNamespace {
                        namespace,
                        detector: name.clone(),
                    });
                }
                Ok(Detection::NoMatch) => {
                    debug!(detector = %name, "no match");
                }
                Err(_) => {
                    warn!(detector = %name, "detector panicked, skipping");
                }
            }
        }
        None
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiates a built-in detector by name.
pub fn builtin_detector(name: &str, rpm_binary: &str) -> Option<Box<dyn NamespaceDetector>> {
    let detector: Box<dyn NamespaceDetector> = match name {
        "nodejs" => Box::new(NodejsDetector::with_rpm_query(Box::new(SystemRpm::new(
            rpm_binary,
        )))),
        "alpine-release" => Box::new(AlpineReleaseDetector),
        "redhat-release" => Box::new(RedhatReleaseDetector),
        "os-release" => Box::new(OsReleaseDetector),
        "lsb-release" => Box::new(LsbReleaseDetector),
        "debian-version" => Box::new(DebianVersionDetector),
        _ => return None,
    };
    Some(detector)
}

/// The process-wide registry of built-in detectors, created on first use.
pub fn default_registry() -> &'static DetectorRegistry {
    static REGISTRY: OnceLock<DetectorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(DetectorRegistry::with_builtins)
}
