use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Severity of a vulnerability, from least to most severe.
///
/// The derived ordering follows declaration order, so
/// `Priority::Unknown < Priority::Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Unknown,
    Negligible,
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Every priority, least severe first.
    pub const ALL: [Priority; 6] = [
        Priority::Unknown,
        Priority::Negligible,
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Unknown => "Unknown",
            Priority::Negligible => "Negligible",
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    /// Compares severity ranks.
    pub fn compare(&self, other: &Priority) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if `self` is as severe as `threshold` or more.
    pub fn at_least(&self, threshold: Priority) -> bool {
        *self >= threshold
    }

    /// Returns true if `name` is one of the six priority names.
    pub fn is_valid(name: &str) -> bool {
        name.parse::<Priority>().is_ok()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

/// Upper end of the scoring scale.
const MAX_SCORE: f64 = 10.0;

/// Maps a numeric vulnerability score (CVSS scale, 0.0 to 10.0) to a
/// priority.
///
/// Scores outside the scale, and NaN, map to [`Priority::Unknown`].
pub fn score_to_priority(score: f64) -> Priority {
    match score {
        s if s.is_nan() || s < 0.0 || s > MAX_SCORE => Priority::Unknown,
        s if s < 1.0 => Priority::Negligible,
        s if s < 3.0 => Priority::Low,
        s if s < 7.0 => Priority::Medium,
        s if s < 9.0 => Priority::High,
        _ => Priority::Critical,
    }
}
