use super::{VersionScheme, DPKG};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Semantic Versioning 2.0 ordering, used for language runtimes.
///
/// Every version is mapped to a Debian-style sort key and the keys are
/// compared with dpkg rules, so SemVer and non-SemVer strings share one
/// total order. For valid SemVer (a leading `v` is ignored) the key is
/// `MAJOR.MINOR.PATCH`, with the pre-release attached by `~` so that it
/// sorts before the release. Build metadata does not take part. Anything
/// else is compared as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverScheme;

impl VersionScheme for SemverScheme {
    fn name(&self) -> &'static str {
        "semver"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        DPKG.compare(&sort_key(a), &sort_key(b))
    }
}

fn sort_key(s: &str) -> Cow<'_, str> {
    let stripped = s.strip_prefix('v').unwrap_or(s);
    let Ok(version) = semver::Version::parse(stripped) else {
        return Cow::Borrowed(s);
    };

    let mut key = format!("{}.{}.{}", version.major, version.minor, version.patch);
    if !version.pre.is_empty() {
        key.push('~');
        key.push_str(version.pre.as_str());
    }
    // Fixed revision, so hyphens inside the pre-release stay upstream.
    key.push_str("-0");
    Cow::Owned(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        SemverScheme.compare(a, b)
    }

    #[test]
    fn test_semver_ordering() {
        assert_eq!(cmp("6.1.0", "6.10.0"), Ordering::Less);
        assert_eq!(cmp("v4.2.0", "4.2.0"), Ordering::Equal);
        assert_eq!(cmp("8.0.0", "7.10.1"), Ordering::Greater);
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert_eq!(cmp("1.0.0-alpha", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha", "1.0.0-alpha.1"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha.1", "1.0.0-alpha.beta"), Ordering::Less);
        assert_eq!(cmp("1.0.0-rc.1", "1.0.0-beta.11"), Ordering::Greater);
        assert_eq!(cmp("1.0.0-beta.2", "1.0.0-beta.11"), Ordering::Less);
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        assert_eq!(cmp("1.0.0+build.1", "1.0.0+build.2"), Ordering::Equal);
    }

    #[test]
    fn test_non_semver_uses_debian_rules() {
        assert_eq!(cmp("6.1", "6.1.0"), Ordering::Less);
        assert_eq!(cmp("6.7.0-r0", "6.7.0-r1"), Ordering::Less);
        assert_eq!(cmp("4.2.6~dfsg", "4.2.6"), Ordering::Less);
        assert_eq!(cmp("1:0.1", "9.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_mixed_prerelease_ordering_is_consistent() {
        assert_eq!(cmp("1.0.0-alpha", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0", "1.0.0-alpha~"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha", "1.0.0-alpha~"), Ordering::Less);
    }

    #[test]
    fn test_total_order_over_mixed_versions() {
        let versions = [
            "1.0.0-alpha",
            "1.0.0",
            "1.0.0-alpha~",
            "1.0.0-alpha.1",
            "v1.0.0",
            "1.0",
            "1.0.0~rc1",
            "1.0.0-1",
            "1.0.0-x-y",
            "1:0.1",
            "6.1.0-1nodesource1",
            "6.1.0",
            "0.9.9+build",
            "v6.1",
        ];

        for a in versions {
            assert_eq!(cmp(a, a), Ordering::Equal, "{a}");
            for b in versions {
                assert_eq!(cmp(a, b), cmp(b, a).reverse(), "{a} vs {b}");
                for c in versions {
                    if cmp(a, b) != Ordering::Greater && cmp(b, c) != Ordering::Greater {
                        assert_ne!(cmp(a, c), Ordering::Greater, "{a} <= {b} <= {c}");
                    }
                }
            }
        }
    }
}
