use super::{file_text, namespace, parse_key_values, Detection, LayerFiles, NamespaceDetector};

const OS_RELEASE_FILES: &[&str] = &["etc/os-release", "usr/lib/os-release"];

/// Detects the distribution from the freedesktop `os-release` file.
///
/// The namespace is `ID:VERSION_ID`, with the ID lowercased.
pub struct OsReleaseDetector;

impl NamespaceDetector for OsReleaseDetector {
    fn name(&self) -> &'static str {
        "os-release"
    }

    fn required_files(&self) -> &[&'static str] {
        &["^etc/os-release", "^usr/lib/os-release"]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        // etc/os-release overrides the vendor copy when both exist.
        let Some(content) = OS_RELEASE_FILES.iter().find_map(|path| file_text(files, path)) else {
            return Detection::NoMatch;
        };

        let values = parse_key_values(&content);
        match (values.get("ID"), values.get("VERSION_ID")) {
            (Some(id), Some(version)) if !id.is_empty() => {
                namespace(self.name(), &id.to_lowercase(), version)
            }
            _ => Detection::NoMatch,
        }
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

    const DEBIAN_OS_RELEASE: &str = r#"PRETTY_NAME="Debian GNU/Linux 8 (jessie)"
NAME="Debian GNU/Linux"
VERSION_ID="8"
VERSION="8 (jessie)"
ID=debian
HOME_URL="http://www.debian.org/"
"#;

    const UBUNTU_OS_RELEASE: &str = r#"NAME="Ubuntu"
VERSION="16.04 LTS (Xenial Xerus)"
ID=ubuntu
ID_LIKE=debian
VERSION_ID="16.04"
"#;

    #[test]
    fn test_os_release() {
        assert_detections(
            &OsReleaseDetector,
            &[
                DetectorCase::new(ns("debian", "8"), layer(&[("etc/os-release", DEBIAN_OS_RELEASE)])),
                DetectorCase::new(
                    ns("ubuntu", "16.04"),
                    layer(&[("usr/lib/os-release", UBUNTU_OS_RELEASE)]),
                ),
                DetectorCase::new(
                    ns("ubuntu", "16.04"),
                    layer(&[
                        ("etc/os-release", UBUNTU_OS_RELEASE),
                        ("usr/lib/os-release", DEBIAN_OS_RELEASE),
                    ]),
                ),
                DetectorCase::new(ns("opensuse", "42.1"), layer(&[(
                    "etc/os-release",
                    "ID=OpenSUSE\nVERSION_ID=\"42.1\"\n",
                )])),
            ],
        );
    }

    #[test]
    fn test_incomplete_os_release() {
        assert_detections(
            &OsReleaseDetector,
            &[
                // Debian sid ships no VERSION_ID.
                DetectorCase::new(
                    None,
                    layer(&[("etc/os-release", "PRETTY_NAME=\"Debian GNU/Linux stretch/sid\"\nID=debian\n")]),
                ),
                DetectorCase::new(None, layer(&[("etc/os-release", "VERSION_ID=8\n")])),
                DetectorCase::new(None, layer(&[("etc/os-release", "ID=debian\nVERSION_ID=\"\"\n")])),
                DetectorCase::new(None, layer(&[("etc/lsb-release", "DISTRIB_ID=Ubuntu\n")])),
            ],
        );
    }
}
