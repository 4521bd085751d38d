use super::{file_text, namespace, Detection, LayerFiles, NamespaceDetector};
use regex::Regex;
use std::sync::LazyLock;

const ALPINE_RELEASE: &str = "etc/alpine-release";

static RELEASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)(?:\.\d+)?").expect("valid alpine release pattern"));

/// Detects Alpine Linux from `etc/alpine-release`.
///
/// Alpine publishes security data per minor release branch, so `3.4.6`
/// maps to `alpine:v3.4`.
pub struct AlpineReleaseDetector;

impl NamespaceDetector for AlpineReleaseDetector {
    fn name(&self) -> &'static str {
        "alpine-release"
    }

    fn required_files(&self) -> &[&'static str] {
        &["^etc/alpine-release"]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        let Some(content) = file_text(files, ALPINE_RELEASE) else {
            return Detection::NoMatch;
        };

        match content.lines().next().and_then(|line| RELEASE_PATTERN.captures(line.trim())) {
            Some(caps) => namespace(self.name(), "alpine", &format!("v{}.{}", &caps[1], &caps[2])),
            None => Detection::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::harness::{assert_detections, layer, DetectorCase};
    use crate::model::Namespace;
    use crate::version::Version;

    fn alpine(branch: &str) -> Option<Namespace> {
        Namespace::new("alpine", Version::new_unchecked(branch))
    }

    #[test]
    fn test_alpine_release() {
        assert_detections(
            &AlpineReleaseDetector,
            &[
                DetectorCase::new(alpine("v3.4"), layer(&[("etc/alpine-release", "3.4.6\n")])),
                DetectorCase::new(alpine("v3.12"), layer(&[("etc/alpine-release", "3.12.0")])),
                DetectorCase::new(alpine("v3.5"), layer(&[("etc/alpine-release", "3.5\n")])),
                DetectorCase::new(None, layer(&[("etc/alpine-release", "edge\n")])),
                DetectorCase::new(None, layer(&[("etc/alpine-release", "")])),
                DetectorCase::new(None, layer(&[("etc/os-release", "ID=alpine\n")])),
            ],
        );
    }
}
