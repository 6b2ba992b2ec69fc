//! Analyze command: extractor response → footprint report

use std::path::Path;

use anyhow::{Context, Result};
use ecomate_core::{parse_extraction_response, EngineConfig, FootprintReport};
use tracing::debug;

use super::{build_engine, print_report, read_input};

/// Build a report from an extractor response held in memory
pub fn analyze_response(config: &EngineConfig, response: &str) -> Result<FootprintReport> {
    let engine = build_engine(config)?;
    let records =
        parse_extraction_response(response).context("Failed to parse extraction response")?;
    debug!("Analyzing {} extracted activities", records.len());
    Ok(engine.process(&records))
}

pub fn cmd_analyze(config: &EngineConfig, input: &Path, json: bool) -> Result<()> {
    let response = read_input(input)?;
    let report = analyze_response(config, &response)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
