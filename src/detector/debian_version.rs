use super::{file_text, namespace, Detection, LayerFiles, NamespaceDetector};

const DEBIAN_VERSION: &str = "etc/debian_version";

/// Release codenames that appear in `etc/debian_version` on testing and
/// unstable images.
const CODENAMES: &[(&str, &str)] = &[
    ("squeeze", "6"),
    ("wheezy", "7"),
    ("jessie", "8"),
    ("stretch", "9"),
    ("buster", "10"),
    ("bullseye", "11"),
    ("bookworm", "12"),
    ("trixie", "13"),
];

/// Detects Debian from `etc/debian_version`.
///
/// The file holds either a point release (`8.6`) or a codename such as
/// `stretch/sid`; both map to the major version.
pub struct DebianVersionDetector;

impl NamespaceDetector for DebianVersionDetector {
    fn name(&self) -> &'static str {
        "debian-version"
    }

    fn required_files(&self) -> &[&'static str] {
        &["^etc/debian_version"]
    }

    fn detect(&self, files: &LayerFiles) -> Detection {
        let Some(content) = file_text(files, DEBIAN_VERSION) else {
            return Detection::NoMatch;
        };
        let Some(line) = content.lines().next().map(str::trim) else {
            return Detection::NoMatch;
        };

        match major_version(line) {
            Some(major) => namespace(self.name(), "debian", major),
            None => Detection::NoMatch,
        }
    }
}

fn major_version(line: &str) -> Option<&str> {
    let major = line.split('.').next().unwrap_or(line);
    if !major.is_empty() && major.bytes().all(|b| b.is_ascii_digit()) {
        return Some(major);
    }

    let codename = line.split('/').next().unwrap_or(line);
    CODENAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(codename))
        .map(|(_, major)| *major)
}
