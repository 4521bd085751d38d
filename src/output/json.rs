use super::ScoredPriority;
use crate::model::ScanReport;
use anyhow::Result;

pub fn print_json(report: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

pub fn print_priority_json(scores: &[ScoredPriority]) -> Result<()> {
    let json = serde_json::to_string_pretty(scores)?;
    println!("{}", json);
    Ok(())
}
