use super::ScoredPriority;
use crate::model::{LayerReport, Priority, ScanReport};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct LayerRow {
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Detector")]
    detector: String,
    #[tabled(rename = "Files")]
    files: String,
}

#[derive(Tabled)]
struct PriorityRow {
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Priority")]
    priority: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.layers.is_empty() {
        println!("No layers scanned.");
        return Ok(());
    }

    println!("{}", render_layer_table(report));
    println!();
    println!(
        "Summary: {} of {} layers identified",
        report.detected(),
        report.layers.len()
    );

    Ok(())
}

pub(super) fn render_layer_table(report: &ScanReport) -> String {
    let rows: Vec<LayerRow> = report.layers.iter().map(layer_row).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn layer_row(layer: &LayerReport) -> LayerRow {
    let namespace = match (&layer.namespace, &layer.error) {
        (Some(ns), _) => ns.to_string(),
        (None, Some(err)) => format!("error: {}", truncate(err, 60)),
        (None, None) => "-".to_string(),
    };

    LayerRow {
        layer: truncate(&layer.layer.display().to_string(), 50),
        namespace,
        detector: layer.detector.clone().unwrap_or_else(|| "-".to_string()),
        files: layer.files_loaded.to_string(),
    }
}

pub fn print_priority_table(scores: &[ScoredPriority]) -> Result<()> {
    let rows: Vec<PriorityRow> = scores
        .iter()
        .map(|s| PriorityRow {
            score: format!("{:.1}", s.score),
            priority: format_priority(s.priority),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

fn format_priority(priority: Priority) -> String {
    match priority {
        Priority::Critical => "\x1b[31mCritical\x1b[0m".to_string(),
        Priority::High => "\x1b[91mHigh\x1b[0m".to_string(),
        Priority::Medium => "\x1b[33mMedium\x1b[0m".to_string(),
        Priority::Low => "\x1b[32mLow\x1b[0m".to_string(),
        Priority::Negligible | Priority::Unknown => priority.to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("layers/a-very-long-name", 10), "layers/...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_format_priority() {
        assert!(format_priority(Priority::Critical).contains("Critical"));
        assert_eq!(format_priority(Priority::Unknown), "Unknown");
    }
}
