use super::{DpkgScheme, RpmScheme, SemverScheme};
use std::cmp::Ordering;

/// A version ordering strategy for one family of package ecosystems.
pub trait VersionScheme: Send + Sync {
    /// Short identifier, e.g. `"dpkg"`.
    fn name(&self) -> &'static str;

    /// Orders two version strings of this scheme.
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

pub static DPKG: DpkgScheme = DpkgScheme;
pub static RPM: RpmScheme = RpmScheme;
pub static SEMVER: SemverScheme = SemverScheme;

/// Namespaces whose packages are versioned `epoch:version-release`.
const RPM_NAMESPACES: &[&str] = &["centos", "rhel", "fedora", "oracle", "amzn", "opensuse", "sles"];

/// Selects the scheme used to order versions within a namespace.
///
/// Debian rules are the fallback for every namespace not listed here,
/// which includes `debian`, `ubuntu` and `alpine`.
pub fn scheme_for_namespace(name: &str) -> &'static dyn VersionScheme {
    let name = name.to_ascii_lowercase();
    if RPM_NAMESPACES.contains(&name.as_str()) {
        &RPM
    } else if name == "nodejs" {
        &SEMVER
    } else {
        &DPKG
    }
}

/// Looks up a scheme by its [`VersionScheme::name`].
pub fn scheme_by_name(name: &str) -> Option<&'static dyn VersionScheme> {
    match name.to_ascii_lowercase().as_str() {
        "dpkg" | "deb" | "debian" => Some(&DPKG),
        "rpm" => Some(&RPM),
        "semver" => Some(&SEMVER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_for_namespace() {
        assert_eq!(scheme_for_namespace("centos").name(), "rpm");
        assert_eq!(scheme_for_namespace("RHEL").name(), "rpm");
        assert_eq!(scheme_for_namespace("nodejs").name(), "semver");
        assert_eq!(scheme_for_namespace("debian").name(), "dpkg");
        assert_eq!(scheme_for_namespace("alpine").name(), "dpkg");
        assert_eq!(scheme_for_namespace("something-new").name(), "dpkg");
    }

    #[test]
    fn test_scheme_by_name() {
        assert_eq!(scheme_by_name("rpm").map(|s| s.name()), Some("rpm"));
        assert_eq!(scheme_by_name("deb").map(|s| s.name()), Some("dpkg"));
        assert_eq!(scheme_by_name("SemVer").map(|s| s.name()), Some("semver"));
        assert!(scheme_by_name("pacman").is_none());
    }

    #[test]
    fn test_schemes_disagree_on_caret() {
        // `^` is a post-release marker for RPM but a plain separator for dpkg.
        assert_eq!(RPM.compare("1.0^git1", "1.0.1"), Ordering::Less);
        assert_eq!(DPKG.compare("1.0^git1", "1.0.1"), Ordering::Greater);
    }
}
