use super::{file_text, namespace, parse_key_values, Detection, LayerFiles, NamespaceDetector};

const LSB_RELEASE: &str = "etc/lsb-release";

/// Detects the distribution from `etc/lsb-release`.
pub struct LsbReleaseDetector;

impl NamespaceDetector for LsbReleaseDetector {
    fn name(&self) -> &'static str {
        "lsb-release"
    }

    fn required_files(&self) -> &[&'static str] {
        &["^etc/lsb-release"]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        let Some(content) = file_text(files, LSB_RELEASE) else {
            return Detection::NoMatch;
        };

        let values = parse_key_values(&content);
        match (values.get("DISTRIB_ID"), values.get("DISTRIB_RELEASE")) {
            (Some(id), Some(release)) if !id.is_empty() => {
                namespace(self.name(), &id.to_lowercase(), release)
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

    #[test]
    fn test_lsb_release() {
        assert_detections(
            &LsbReleaseDetector,
            &[
                DetectorCase::new(
                    Namespace::new("ubuntu", Version::new_unchecked("12.04")),
                    layer(&[(
                        "etc/lsb-release",
                        "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=12.04\nDISTRIB_CODENAME=precise\nDISTRIB_DESCRIPTION=\"Ubuntu 12.04 LTS\"\n",
                    )]),
                ),
                DetectorCase::new(
                    Namespace::new("linuxmint", Version::new_unchecked("18")),
                    layer(&[("etc/lsb-release", "DISTRIB_ID=\"LinuxMint\"\nDISTRIB_RELEASE=\"18\"\n")]),
                ),
                DetectorCase::new(None, layer(&[("etc/lsb-release", "DISTRIB_ID=Ubuntu\n")])),
                DetectorCase::new(None, layer(&[("etc/lsb-release", "DISTRIB_RELEASE=12.04\n")])),
                DetectorCase::new(None, layer(&[])),
            ],
        );
    }
}
