use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use layerscan::{
    config::{Config, ConfigFileStatus},
    detector::{DetectorRegistry, RequiredFiles, BUILTIN_DETECTORS},
    layer::load_layer,
    logging::init_tracing,
    model::{score_to_priority, LayerReport, ScanReport},
    output::{format_report_to_string, print_priorities, print_report, OutputFormat, ScoredPriority},
    version::{scheme_by_name, scheme_for_namespace, Version, VersionScheme, DPKG},
};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    /// Every layer was read but none was identified.
    pub const NOT_DETECTED: u8 = 2;
    /// `compare` found the first version lower or higher than the second.
    pub const LESS: u8 = 3;
    pub const GREATER: u8 = 4;
}

#[derive(Parser)]
#[command(name = "layerscan")]
#[command(
    author,
    version,
    about = "Identify the package ecosystem of filesystem layers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the namespace of unpacked layer directories
    Scan {
        /// Layer root directories
        #[arg(required = true)]
        layers: Vec<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Detector to run, in priority order (repeatable)
        #[arg(short, long = "detector")]
        detectors: Vec<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable concurrent scanning (scan layers sequentially)
        #[arg(long)]
        no_parallel: bool,
    },

    /// List available detectors
    Detectors,

    /// Map CVSS-style scores (0-10) to priorities
    Priority {
        #[arg(required = true, allow_negative_numbers = true)]
        scores: Vec<f64>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Compare two versions
    Compare {
        a: String,
        b: String,

        /// Comparison scheme (dpkg, rpm, semver)
        #[arg(long, conflicts_with = "namespace")]
        scheme: Option<String>,

        /// Pick the scheme used by this namespace, e.g. centos
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    // Runs before loading so a broken file can still be inspected.
    if let Commands::Config { init, path } = cli.command {
        return handle_config(init, path);
    }

    let config = Config::load().context("failed to load config")?;
    init_tracing(&config.log_level, &config.log_format)?;

    match cli.command {
        Commands::Scan {
            layers,
            format,
            detectors,
            output,
            no_parallel,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let parallel = !no_parallel && config.parallel;
            run_scan(&config, layers, &format_str, detectors, output, parallel).await
        }
        Commands::Detectors => {
            list_detectors(&config);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Priority { scores, format } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
            let scored: Vec<ScoredPriority> = scores
                .into_iter()
                .map(|score| ScoredPriority {
                    score,
                    priority: score_to_priority(score),
                })
                .collect();
            print_priorities(&scored, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Compare {
            a,
            b,
            scheme,
            namespace,
        } => compare_versions(&a, &b, scheme.as_deref(), namespace.as_deref()),
        Commands::Config { init, path } => handle_config(init, path),
    }
}

async fn run_scan(
    config: &Config,
    layers: Vec<PathBuf>,
    format: &str,
    detectors: Vec<String>,
    output_file: Option<PathBuf>,
    parallel: bool,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let names = if detectors.is_empty() {
        config.detectors.clone()
    } else {
        detectors
    };
    let registry = DetectorRegistry::from_names(names.as_slice(), &config.rpm_binary)?;
    let matcher = registry.required_file_matcher()?;
    info!(detectors = ?names, layers = layers.len(), "starting scan");

    let scanner = Arc::new(LayerScanner {
        registry,
        matcher,
        max_file_size: config.max_file_size,
    });

    let reports = if parallel && layers.len() > 1 {
        scan_concurrent(scanner, layers, is_interactive).await
    } else {
        scan_sequential(&scanner, layers, is_interactive)
    };

    let report = ScanReport::new(reports);

    if let Some(path) = output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Results written to: {}", path.display());
    } else {
        print_report(&report, format)?;
    }

    Ok(determine_exit_code(&report))
}

/// Everything needed to scan one layer, shared across blocking tasks.
struct LayerScanner {
    registry: DetectorRegistry,
    matcher: RequiredFiles,
    max_file_size: u64,
}

impl LayerScanner {
    fn scan(&self, layer: PathBuf) -> LayerReport {
        let files = match load_layer(&layer, &self.matcher, self.max_file_size) {
            Ok(files) => files,
            Err(err) => {
                warn!(layer = %layer.display(), error = %err, "failed to load layer");
                return LayerReport::failed(layer, err.to_string());
            }
        };

        let mut report = LayerReport::new(&layer);
        report.files_loaded = files.len();
        if let Some(detected) = self.registry.detect(&files) {
            info!(
                layer = %layer.display(),
                namespace = %detected.namespace,
                detector = %detected.detector,
                "layer identified"
            );
            report.namespace = Some(detected.namespace);
            report.detector = Some(detected.detector);
        }
        report
    }
}

fn progress_bar(len: usize, template: &str) -> Option<ProgressBar> {
    let style = match ProgressStyle::default_bar().template(template) {
        Ok(style) => style.progress_chars("#>-"),
        Err(err) => {
            warn!(error = %err, "invalid progress template");
            return None;
        }
    };
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Scan all layers concurrently on the blocking thread pool
async fn scan_concurrent(
    scanner: Arc<LayerScanner>,
    layers: Vec<PathBuf>,
    is_interactive: bool,
) -> Vec<LayerReport> {
    let progress = if is_interactive {
        progress_bar(
            layers.len(),
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Scanning layers...",
        )
        .map(Arc::new)
    } else {
        None
    };

    let futures: Vec<_> = layers
        .into_iter()
        .map(|layer| {
            let scanner = Arc::clone(&scanner);
            let pb = progress.clone();
            async move {
                let path = layer.clone();
                let report = match tokio::task::spawn_blocking(move || scanner.scan(layer)).await {
                    Ok(report) => report,
                    Err(err) => LayerReport::failed(path, format!("scan task failed: {}", err)),
                };
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                report
            }
        })
        .collect();

    let reports = join_all(futures).await;

    if let Some(pb) = progress {
        let detected = reports.iter().filter(|r| r.namespace.is_some()).count();
        pb.finish_with_message(format!("Identified {} layers", detected));
    }

    reports
}

/// Scan layers one after another
fn scan_sequential(
    scanner: &LayerScanner,
    layers: Vec<PathBuf>,
    is_interactive: bool,
) -> Vec<LayerReport> {
    let progress = if is_interactive {
        progress_bar(layers.len(), "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    } else {
        None
    };

    let mut reports = Vec::with_capacity(layers.len());
    for layer in layers {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Scanning {}...", layer.display()));
        }
        reports.push(scanner.scan(layer));
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Identified {} layers",
            reports.iter().filter(|r| r.namespace.is_some()).count()
        ));
    }

    reports
}

/// Any unreadable layer is an error; otherwise fail only when nothing was identified.
fn determine_exit_code(report: &ScanReport) -> u8 {
    if report.layers.iter().any(|l| l.error.is_some()) {
        exit_codes::ERROR
    } else if report.detected() == 0 {
        exit_codes::NOT_DETECTED
    } else {
        exit_codes::SUCCESS
    }
}

fn compare_versions(
    a: &str,
    b: &str,
    scheme: Option<&str>,
    namespace: Option<&str>,
) -> Result<u8> {
    let scheme: &dyn VersionScheme = match (scheme, namespace) {
        (Some(name), _) => scheme_by_name(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown scheme: {}. Use: dpkg, rpm, semver", name))?,
        (None, Some(ns)) => scheme_for_namespace(ns),
        (None, None) => &DPKG,
    };

    let a = Version::new(a)?;
    let b = Version::new(b)?;
    let ordering = a.compare_with(&b, scheme);

    let symbol = match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "==",
        Ordering::Greater => ">",
    };
    println!("{} {} {}  ({})", a, symbol, b, scheme.name());

    Ok(match ordering {
        Ordering::Less => exit_codes::LESS,
        Ordering::Equal => exit_codes::SUCCESS,
        Ordering::Greater => exit_codes::GREATER,
    })
}

fn list_detectors(config: &Config) {
    println!("Available detectors (default order):");
    println!();

    let evidence = [
        ("nodejs", "var/lib/dpkg/status, lib/apk/db/installed, var/lib/rpm/Packages"),
        ("alpine-release", "etc/alpine-release"),
        ("redhat-release", "etc/{oracle,centos,redhat,system}-release"),
        ("os-release", "etc/os-release, usr/lib/os-release"),
        ("lsb-release", "etc/lsb-release"),
        ("debian-version", "etc/debian_version"),
    ];

    for name in BUILTIN_DETECTORS {
        let enabled = if config.detectors.iter().any(|d| d == name) {
            "yes"
        } else {
            "no"
        };
        let files = evidence
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
            .unwrap_or("-");

        println!("  {:<16} [enabled: {}]", name, enabled);
        println!("  {:<16} Reads: {}", "", files);
        println!();
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<u8> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(exit_codes::SUCCESS);
    }

    match Config::inspect(&config_path) {
        ConfigFileStatus::Missing if init => {
            Config::default().save()?;
            println!("Wrote default configuration to {}", config_path.display());
            println!();
            print!("{}", Config::generate_default_config());
            Ok(exit_codes::SUCCESS)
        }
        ConfigFileStatus::Missing => {
            println!("No config file at {}; built-in defaults apply:", config_path.display());
            println!();
            print!("{}", Config::generate_default_config());
            println!();
            println!("Run 'layerscan config --init' to write them out.");
            Ok(exit_codes::SUCCESS)
        }
        ConfigFileStatus::Valid(config) => {
            if init {
                println!("Keeping existing config at {}", config_path.display());
            } else {
                println!("Config file: {} (valid)", config_path.display());
            }
            println!();
            println!("Effective settings:");
            print!("{}", config.to_toml()?);
            Ok(exit_codes::SUCCESS)
        }
        ConfigFileStatus::Invalid(reason) => {
            eprintln!("Config file {} is invalid: {}", config_path.display(), reason);
            Ok(exit_codes::ERROR)
        }
    }
}
