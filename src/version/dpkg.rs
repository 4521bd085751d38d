//! Debian version ordering, as implemented by `dpkg --compare-versions`.
//!
//! A version is `[epoch:]upstream[-revision]`. Epochs compare numerically,
//! then upstream and revision are compared with the same algorithm:
//! alternating non-digit and digit runs, where in non-digit runs letters
//! sort before everything else, `~` sorts before the end of the string,
//! and digit runs compare as integers.

use super::VersionScheme;
use std::cmp::Ordering;

/// Debian/dpkg ordering rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpkgScheme;

impl VersionScheme for DpkgScheme {
    fn name(&self) -> &'static str {
        "dpkg"
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let a = DebVersion::parse(a);
        let b = DebVersion::parse(b);

        compare_numeric(a.epoch, b.epoch)
            .then_with(|| verrevcmp(a.upstream, b.upstream))
            .then_with(|| verrevcmp(a.revision, b.revision))
    }
}

struct DebVersion<'a> {
    epoch: &'a str,
    upstream: &'a str,
    revision: &'a str,
}

impl<'a> DebVersion<'a> {
    fn parse(s: &'a str) -> Self {
        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) if !epoch.is_empty() && epoch.bytes().all(|c| c.is_ascii_digit()) => {
                (epoch, rest)
            }
            _ => ("0", s),
        };

        let (upstream, revision) = match rest.rfind('-') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };

        Self {
            epoch,
            upstream,
            revision,
        }
    }
}

/// Compares two strings of ASCII digits by numeric value, without overflow.
pub(super) fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort weight of a character inside a non-digit run.
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        let is_digit = |s: &[u8], k: usize| s.get(k).is_some_and(u8::is_ascii_digit);

        while (i < a.len() && !is_digit(a, i)) || (j < b.len() && !is_digit(b, j)) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while is_digit(a, i) && is_digit(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        if is_digit(a, i) {
            return Ordering::Greater;
        }
        if is_digit(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        DpkgScheme.compare(a, b)
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(cmp("1.0", "1.0"), Ordering::Equal);
        assert_eq!(cmp("0:1.0", "1.0"), Ordering::Equal);
        assert_eq!(cmp("1.0-0", "1.0-0"), Ordering::Equal);
        assert_eq!(cmp("1.01", "1.1"), Ordering::Equal);
    }

    #[test]
    fn test_epoch_dominates() {
        assert_eq!(cmp("1:0.1", "2.0"), Ordering::Greater);
        assert_eq!(cmp("1:2.0", "2:1.0"), Ordering::Less);
        assert_eq!(cmp("10:1.0", "9:1.0"), Ordering::Greater);
    }

    #[test]
    fn test_numeric_runs_compare_numerically() {
        assert_eq!(cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(cmp("2.30", "2.4"), Ordering::Greater);
        assert_eq!(cmp("1.0.10", "1.0.2"), Ordering::Greater);
    }

    #[test]
    fn test_tilde_sorts_before_everything() {
        assert_eq!(cmp("1.0~rc1", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.0~~", "1.0~"), Ordering::Less);
        assert_eq!(cmp("1.0~rc1", "1.0~rc2"), Ordering::Less);
        assert_eq!(cmp("1.0~beta", "1.0~alpha"), Ordering::Greater);
    }

    #[test]
    fn test_letters_sort_before_symbols() {
        assert_eq!(cmp("1.0a", "1.0+"), Ordering::Less);
        assert_eq!(cmp("1.0+dfsg", "1.0"), Ordering::Greater);
        assert_eq!(cmp("1.0a", "1.0"), Ordering::Greater);
    }

    #[test]
    fn test_revision_compared_last() {
        assert_eq!(cmp("1.0-1", "1.0-2"), Ordering::Less);
        assert_eq!(cmp("1.0-1ubuntu1", "1.0-1"), Ordering::Greater);
        assert_eq!(cmp("1.0-10", "1.0-9"), Ordering::Greater);
        assert_eq!(cmp("1.0", "1.0-1"), Ordering::Less);
    }

    #[test]
    fn test_hyphen_in_upstream() {
        // Only the last hyphen separates the revision.
        assert_eq!(cmp("1.0-beta-1", "1.0-beta-2"), Ordering::Less);
        assert_eq!(cmp("2.2.4-1-nodesource1", "2.2.4-1-nodesource2"), Ordering::Less);
    }

    #[test]
    fn test_trailing_component_sorts_higher() {
        assert_eq!(cmp("1.2", "1.2.0"), Ordering::Less);
        assert_eq!(cmp("1.2.0", "1.2"), Ordering::Greater);
    }

    #[test]
    fn test_compare_numeric_handles_huge_values() {
        assert_eq!(
            compare_numeric("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
        assert_eq!(compare_numeric("007", "7"), Ordering::Equal);
    }
}
