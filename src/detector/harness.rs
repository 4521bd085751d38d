//! Table-driven test support for detectors.
//!
//! ```
//! use layerscan::detector::harness::{assert_detections, layer, DetectorCase};
//! use layerscan::detector::DebianVersionDetector;
//! use layerscan::model::Namespace;
//! use layerscan::version::Version;
//!
//! assert_detections(
//!     &DebianVersionDetector,
//!     &[
//!         DetectorCase::new(
//!             Namespace::new("debian", Version::new_unchecked("8")),
//!             layer(&[("etc/debian_version", "8.6\n")]),
//!         ),
//!         DetectorCase::new(None, layer(&[])),
//!     ],
//! );
//! ```

use super::{LayerFiles, NamespaceDetector};
use crate::model::Namespace;

/// One row of a detector table: the files of a layer and the namespace
/// the detector is expected to report for them.
#[derive(Debug, Clone)]
pub struct DetectorCase {
    pub expected: Option<Namespace>,
    pub files: LayerFiles,
}

impl DetectorCase {
    pub fn new(expected: Option<Namespace>, files: LayerFiles) -> Self {
        Self { expected, files }
    }
}

/// Builds a layer from `(path, contents)` pairs.
pub fn layer(entries: &[(&str, &str)]) -> LayerFiles {
    entries
        .iter()
        .map(|(path, contents)| (path.to_string(), contents.as_bytes().to_vec()))
        .collect()
}

/// Runs `detector` over every case and panics on the first mismatch.
///
/// Also asserts that every file in each case is covered by the detector's
/// required-file patterns, so a layer loaded from disk would contain it.
pub fn assert_detections(detector: &dyn NamespaceDetector, cases: &[DetectorCase]) {
    let patterns: Vec<regex::Regex> = detector
        .required_files()
        .iter()
        .map(|p| {
            regex::Regex::new(p)
                .unwrap_or_else(|e| panic!("{}: invalid required file {p:?}: {e}", detector.name()))
        })
        .collect();

    for (i, case) in cases.iter().enumerate() {
        let found = detector.detect(&case.files).into_option();
        assert_eq!(
            found,
            case.expected,
            "{}: case {} with files {:?}",
            detector.name(),
            i,
            case.files.keys().collect::<Vec<_>>()
        );

        if case.expected.is_some() {
            for path in case.files.keys() {
                assert!(
                    patterns.iter().any(|re| re.is_match(path)),
                    "{}: case {} reads {} which is not a required file",
                    detector.name(),
                    i,
                    path
                );
            }
        }
    }
}
