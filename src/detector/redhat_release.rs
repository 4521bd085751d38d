use super::{file_text, namespace, Detection, LayerFiles, NamespaceDetector};
use regex::Regex;
use std::sync::LazyLock;

/// Release files, most specific first. `system-release` is shared by
/// every distribution in the family, so it is read last.
const RELEASE_FILES: &[&str] = &[
    "etc/oracle-release",
    "etc/centos-release",
    "etc/redhat-release",
    "etc/system-release",
];

static RELEASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<os>.+?)\s+release\s+(?P<version>\d+)")
        .expect("valid redhat release pattern")
});

/// Detects the Red Hat family from its `*-release` files.
///
/// Only the major version is kept: `CentOS Linux release 7.1.1503 (Core)`
/// is `centos:7`.
pub struct RedhatReleaseDetector;

impl NamespaceDetector for RedhatReleaseDetector {
    fn name(&self) -> &'static str {
        "redhat-release"
    }

    fn required_files(&self) -> &[&'static str] {
        &[
            "^etc/oracle-release",
            "^etc/centos-release",
            "^etc/redhat-release",
            "^etc/system-release",
        ]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        for path in RELEASE_FILES {
            let Some(content) = file_text(files, path) else {
                continue;
            };
            let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) else {
                continue;
            };
            let Some(caps) = RELEASE_PATTERN.captures(line) else {
                continue;
            };
            if let Some(os) = distribution(&caps["os"]) {
                return namespace(self.name(), os, &caps["version"]);
            }
        }
        Detection::NoMatch
    }
}

/// Maps the product name in a release line to a namespace name.
fn distribution(product: &str) -> Option<&'static str> {
    let product = product.to_ascii_lowercase();
    if product.starts_with("centos") {
        Some("centos")
    } else if product.starts_with("red hat enterprise linux") {
        Some("rhel")
    } else if product.starts_with("oracle linux") {
        Some("oracle")
    } else if product.starts_with("fedora") {
        Some("fedora")
    } else if product.starts_with("amazon linux") {
        Some("amzn")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::harness::{assert_detections, layer, DetectorCase};
    use crate::model::Namespace;
    use crate::version::Version;

    fn ns(name: &str, version: &str) -> Option<Namespace> {
        Namespace::new(name, Version::new_unchecked(version))
    }

    #[test]
    fn test_centos_release() {
        assert_detections(
            &RedhatReleaseDetector,
            &[
                DetectorCase::new(
                    ns("centos", "6"),
                    layer(&[("etc/centos-release", "CentOS release 6.6 (Final)")]),
                ),
                DetectorCase::new(
                    ns("centos", "7"),
                    layer(&[("etc/system-release", "CentOS Linux release 7.1.1503 (Core)")]),
                ),
            ],
        );
    }

    #[test]
    fn test_other_distributions() {
        assert_detections(
            &RedhatReleaseDetector,
            &[
                DetectorCase::new(
                    ns("rhel", "7"),
                    layer(&[(
                        "etc/redhat-release",
                        "Red Hat Enterprise Linux Server release 7.2 (Maipo)\n",
                    )]),
                ),
                DetectorCase::new(
                    ns("oracle", "7"),
                    layer(&[
                        ("etc/oracle-release", "Oracle Linux Server release 7.3\n"),
                        ("etc/redhat-release", "Red Hat Enterprise Linux Server release 7.3\n"),
                    ]),
                ),
                DetectorCase::new(
                    ns("fedora", "25"),
                    layer(&[("etc/system-release", "Fedora release 25 (Twenty Five)\n")]),
                ),
                DetectorCase::new(
                    ns("amzn", "2"),
                    layer(&[("etc/system-release", "Amazon Linux release 2 (Karoo)\n")]),
                ),
            ],
        );
    }

    #[test]
    fn test_unrecognised_release_files() {
        assert_detections(
            &RedhatReleaseDetector,
            &[
                DetectorCase::new(None, layer(&[("etc/system-release", "Scientific Linux\n")])),
                DetectorCase::new(
                    None,
                    layer(&[("etc/system-release", "Mystery OS release 4\n")]),
                ),
                DetectorCase::new(None, layer(&[("etc/centos-release", "")])),
                DetectorCase::new(None, layer(&[("etc/os-release", "ID=centos\n")])),
            ],
        );
    }

    #[test]
    fn test_specific_file_wins_over_system_release() {
        let files = layer(&[
            ("etc/centos-release", "CentOS release 6.6 (Final)"),
            ("etc/system-release", "Fedora release 25 (Twenty Five)"),
        ]);
        assert_eq!(RedhatReleaseDetector.detect(&files).into_option(), ns("centos", "6"));
    }
}
