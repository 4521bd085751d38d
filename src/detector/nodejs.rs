use super::rpm::{installed_version, RpmQuery, SystemRpm};
use super::{file_text, namespace, Detection, DetectionError, LayerFiles, NamespaceDetector};
use tracing::{debug, warn};

const NODEJS_PACKAGE: &str = "nodejs";

const DPKG_STATUS: &str = "var/lib/dpkg/status";
const APK_INSTALLED: &str = "lib/apk/db/installed";
const RPM_PACKAGES: &str = "var/lib/rpm/Packages";

/// Detects a Node.js runtime from the system package database.
///
/// The dpkg status file is checked first, then the apk installed index,
/// then the RPM database. The namespace is `nodejs:<package version>`.
pub struct NodejsDetector {
    rpm: Box<dyn RpmQuery>,
}

impl NodejsDetector {
    pub fn new() -> Self {
        Self::with_rpm_query(Box::new(SystemRpm::default()))
    }

    pub fn with_rpm_query(rpm: Box<dyn RpmQuery>) -> Self {
        Self { rpm }
    }
}

impl Default for NodejsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceDetector for NodejsDetector {
    fn name(&self) -> &'static str {
        "nodejs"
    }

    fn required_files(&self) -> &[&'static str] {
        &["^var/lib/rpm/Packages", "^var/lib/dpkg/status", "^lib/apk/db/installed"]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        let version = self
            .detect_index(files, DPKG_STATUS, "Package: ", "Version: ")
            .or_else(|| self.detect_index(files, APK_INSTALLED, "P:", "V:"))
            .or_else(|| self.detect_rpm(files));

        match version {
            Some(version) => namespace(self.name(), NODEJS_PACKAGE, &version),
            None => Detection::NoMatch,
        }
    }
}

impl NodejsDetector {
    /// Scans a line-oriented package index for the nodejs record.
    fn detect_index(
        &self,
        files: &LayerFiles,
        path: &str,
        package_field: &str,
        version_field: &str,
    ) -> Option<String> {
        let content = file_text(files, path)?;

        match find_package_version(&content, path, package_field, version_field) {
            Ok(version) => version,
            Err(err) => {
                debug!(detector = self.name(), error = %err, "no match");
                None
            }
        }
    }

    fn detect_rpm(&self, files: &LayerFiles) -> Option<String> {
        let database = files.get(RPM_PACKAGES)?;

        match installed_version(self.rpm.as_ref(), database, NODEJS_PACKAGE) {
            Ok(version) => version,
            Err(err) => {
                warn!(
                    detector = self.name(),
                    error = %err,
                    "could not query RPM {}",
                    NODEJS_PACKAGE
                );
                None
            }
        }
    }
}

/// Returns the version declared for the nodejs package.
///
/// Once the nodejs record has started, any other package record before its
/// version line makes the result ambiguous.
fn find_package_version(
    content: &str,
    path: &str,
    package_field: &str,
    version_field: &str,
) -> Result<Option<String>, DetectionError> {
    let mut in_nodejs = false;

    for line in content.lines() {
        if let Some(name) = line.strip_prefix(package_field) {
            let name = name.trim();
            if name == NODEJS_PACKAGE {
                in_nodejs = true;
            } else if in_nodejs {
                return Err(DetectionError::AmbiguousIdentity {
                    path: path.to_string(),
                    expected: NODEJS_PACKAGE.to_string(),
                    found: name.to_string(),
                });
            }
        } else if in_nodejs {
            if let Some(version) = line.strip_prefix(version_field) {
                return Ok(Some(version.trim().to_string()));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::harness::{assert_detections, layer, DetectorCase};
    use crate::model::Namespace;
    use crate::version::Version;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn nodejs(version: &str) -> Option<Namespace> {
        Namespace::new("nodejs", Version::new_unchecked(version))
    }

    /// Fails every query, recording the scratch directory it was given.
    #[derive(Default)]
    struct FailingRpm {
        dirs: Mutex<Vec<PathBuf>>,
    }

    impl RpmQuery for FailingRpm {
        fn query_package(&self, db_dir: &Path, _package: &str) -> Result<String, DetectionError> {
            self.dirs.lock().unwrap().push(db_dir.to_path_buf());
            Err(DetectionError::Query("rpm: exit status 1".to_string()))
        }
    }

    struct FixedRpm(&'static str);

    impl RpmQuery for FixedRpm {
        fn query_package(&self, _db_dir: &Path, _package: &str) -> Result<String, DetectionError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_dpkg_status() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FailingRpm::default()));
        assert_detections(
            &detector,
            &[
                DetectorCase::new(
                    nodejs("6.1.0"),
                    layer(&[(
                        "var/lib/dpkg/status",
                        "Package: nodejs\nStatus: install ok installed\nPriority: optional\nVersion: 6.1.0\n\nPackage: curl\nVersion: 7.38.0-4\n",
                    )]),
                ),
                DetectorCase::new(
                    nodejs("4.6.1-1nodesource1~jessie1"),
                    layer(&[(
                        "var/lib/dpkg/status",
                        "Package: curl\nVersion: 7.38.0-4\n\nPackage: nodejs\nVersion: 4.6.1-1nodesource1~jessie1\n",
                    )]),
                ),
                DetectorCase::new(
                    None,
                    layer(&[(
                        "var/lib/dpkg/status",
                        "Package: nodejs\nStatus: install ok installed\n\nPackage: npm\nVersion: 1.4.21\n",
                    )]),
                ),
                DetectorCase::new(
                    None,
                    layer(&[("var/lib/dpkg/status", "Package: curl\nVersion: 7.38.0-4\n")]),
                ),
            ],
        );
    }

    #[test]
    fn test_apk_installed() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FailingRpm::default()));
        assert_detections(
            &detector,
            &[
                DetectorCase::new(
                    nodejs("6.7.0-r0"),
                    layer(&[(
                        "lib/apk/db/installed",
                        "C:Q1abc=\nP:musl\nV:1.1.14-r14\n\nC:Q1def=\nP:nodejs\nV:6.7.0-r0\nA:x86_64\n",
                    )]),
                ),
                DetectorCase::new(
                    None,
                    layer(&[("lib/apk/db/installed", "P:nodejs\nA:x86_64\n\nP:libuv\nV:1.9.1-r0\n")]),
                ),
            ],
        );
    }

    #[test]
    fn test_missing_files_is_no_match() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FailingRpm::default()));
        assert_detections(
            &detector,
            &[
                DetectorCase::new(None, LayerFiles::new()),
                DetectorCase::new(None, layer(&[("etc/os-release", "ID=debian\n")])),
            ],
        );
    }

    #[test]
    fn test_rpm_database() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FixedRpm(
            "Name        : nodejs\nVersion     : 6.9.1\nRelease     : 1nodesource\n",
        )));
        assert_detections(
            &detector,
            &[DetectorCase::new(
                nodejs("6.9.1"),
                layer(&[("var/lib/rpm/Packages", "binary")]),
            )],
        );
    }

    #[test]
    fn test_rpm_failure_is_no_match_and_cleans_up() {
        let rpm = std::sync::Arc::new(FailingRpm::default());

        struct Shared(std::sync::Arc<FailingRpm>);
        impl RpmQuery for Shared {
            fn query_package(&self, db_dir: &Path, package: &str) -> Result<String, DetectionError> {
                self.0.query_package(db_dir, package)
            }
        }

        let detector = NodejsDetector::with_rpm_query(Box::new(Shared(rpm.clone())));
        let files = layer(&[("var/lib/rpm/Packages", "binary")]);

        assert_eq!(detector.detect(&files), Detection::NoMatch);

        let dirs = rpm.dirs.lock().unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
    }

    #[test]
    fn test_missing_rpm_binary_is_no_match() {
        let detector =
            NodejsDetector::with_rpm_query(Box::new(SystemRpm::new("/nonexistent/layerscan-rpm")));
        let files = layer(&[("var/lib/rpm/Packages", "binary")]);
        assert_eq!(detector.detect(&files), Detection::NoMatch);
    }

    #[test]
    fn test_dpkg_preferred_over_rpm() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FixedRpm("Version     : 9.9.9\n")));
        let files = layer(&[
            ("var/lib/dpkg/status", "Package: nodejs\nVersion: 6.1.0\n"),
            ("var/lib/rpm/Packages", "binary"),
        ]);
        assert_eq!(detector.detect(&files).into_option(), nodejs("6.1.0"));
    }

    #[test]
    fn test_display_matches_namespace_string() {
        let detector = NodejsDetector::with_rpm_query(Box::new(FailingRpm::default()));
        let files = layer(&[("var/lib/dpkg/status", "Package: nodejs\nVersion: 6.1.0\n")]);
        let ns = detector.detect(&files).into_option().unwrap();
        assert_eq!(ns.to_string(), "nodejs:6.1.0");
    }
}
