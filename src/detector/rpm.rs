//! RPM database queries.
//!
//! There is no native parser for the RPM database format, so the database
//! bytes are written to a scratch directory and queried with the `rpm`
//! tool. The [`RpmQuery`] trait keeps the subprocess behind a seam that
//! tests can replace.

use super::DetectionError;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Runs a package query against an RPM database directory.
pub trait RpmQuery: Send + Sync {
    /// Returns the `rpm -qi` style output for `package` in the database
    /// stored in `db_dir`.
    fn query_package(&self, db_dir: &Path, package: &str) -> Result<String, DetectionError>;
}

/// [`RpmQuery`] backed by the `rpm` executable.
#[derive(Debug, Clone)]
pub struct SystemRpm {
    binary: String,
}

impl SystemRpm {
    pub const DEFAULT_BINARY: &'static str = "rpm";

    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for SystemRpm {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl RpmQuery for SystemRpm {
    fn query_package(&self, db_dir: &Path, package: &str) -> Result<String, DetectionError> {
        // Output is parsed by field name, so pin the locale.
        let output = Command::new(&self.binary)
            .current_dir(db_dir)
            .env("LC_ALL", "C")
            .arg("--dbpath")
            .arg(db_dir)
            .args(["-qi", package])
            .output()
            .map_err(|source| DetectionError::Io {
                context: format!("failed to execute {}", self.binary),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(DetectionError::Query(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stdout.trim()
            )));
        }

        Ok(stdout)
    }
}

/// Materialises `database` as `Packages` in a fresh scratch directory and
/// asks `rpm` for the version of `package`.
///
/// Returns `Ok(None)` when the query succeeds but reports no version. The
/// scratch directory is removed on every return path.
pub(crate) fn installed_version(
    rpm: &dyn RpmQuery,
    database: &[u8],
    package: &str,
) -> Result<Option<String>, DetectionError> {
    let scratch = tempfile::Builder::new()
        .prefix("rpm")
        .tempdir()
        .map_err(|source| DetectionError::Io {
            context: "could not create temporary folder for RPM detection".to_string(),
            source,
        })?;

    fs::write(scratch.path().join("Packages"), database).map_err(|source| DetectionError::Io {
        context: "could not create temporary file for RPM detection".to_string(),
        source,
    })?;

    let output = rpm.query_package(scratch.path(), package)?;
    Ok(parse_version_field(&output))
}

/// Extracts the value of the first `Version : x` line.
fn parse_version_field(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.starts_with("Version"))
        .find_map(|line| {
            let mut parts = line.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(_), Some(value), None) => Some(value.trim().to_string()),
                _ => None,
            }
        })
        .filter(|v| !v.is_empty())
}
