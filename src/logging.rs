//! Logging initialization.
//!
//! Configures `tracing-subscriber` from the `log_level` and `log_format`
//! configuration values. Log lines go to stderr so that JSON reports on
//! stdout stay machine-readable.

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Supported values for `log_format`.
pub const LOG_FORMATS: &[&str] = &["compact", "pretty", "json"];

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Formats
///
/// * `"compact"` - Single-line human-readable output (default)
/// * `"pretty"` - Multi-line output with source locations
/// * `"json"` - Machine-parseable JSON lines
///
/// # Errors
///
/// Fails on an unknown format or if a global subscriber is already set.
pub fn init_tracing(level: &str, format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match format {
        "compact" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt.compact())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize compact tracing subscriber: {}", e))?,
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt.pretty())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e))?,
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt.json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e))?,
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected one of: {}",
                format,
                LOG_FORMATS.join(", ")
            ));
        }
    }

    Ok(())
}
