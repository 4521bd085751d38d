//! Core data types shared by detection, scoring and reporting.
//!
//! - [`Namespace`] - The detected package ecosystem of a snapshot
//! - [`Priority`] - Ordered vulnerability severity
//! - [`LayerReport`] / [`ScanReport`] - Scan results
//!
//! # Example
//!
//! ```
//! use layerscan::model::{score_to_priority, Priority};
//!
//! let priority = score_to_priority(7.5);
//! assert_eq!(priority, Priority::High);
//! assert!(priority.at_least(Priority::Medium));
//! ```

mod namespace;
mod priority;
mod report;

pub use namespace::*;
pub use priority::*;
pub use report::*;
