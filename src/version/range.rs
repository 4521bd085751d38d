use super::{Version, VersionScheme};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A half-open range of affected versions: `introduced <= v < fixed`.
///
/// A missing bound is open on that side, so `{ introduced: None, fixed:
/// None }` contains every version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduced: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Version>,
}

impl VersionRange {
    pub fn new(introduced: Option<Version>, fixed: Option<Version>) -> Self {
        Self { introduced, fixed }
    }

    /// Returns true if `installed` falls inside the range under `scheme`.
    pub fn contains(&self, installed: &Version, scheme: &dyn VersionScheme) -> bool {
        if let Some(introduced) = &self.introduced {
            if installed.compare_with(introduced, scheme) == Ordering::Less {
                return false;
            }
        }

        if let Some(fixed) = &self.fixed {
            if installed.compare_with(fixed, scheme) != Ordering::Less {
                return false;
            }
        }

        true
    }
}
