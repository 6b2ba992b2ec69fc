//! Sanitize command: raw result batch → bounded report
//!
//! Needs no emission-factor table; only the configured limits apply.

use std::path::Path;

use anyhow::{Context, Result};
use ecomate_core::{EngineConfig, FootprintReport, ResultSanitizer};
use serde_json::Value;

use super::{print_report, read_input};

pub fn sanitize_batch(config: &EngineConfig, content: &str) -> Result<FootprintReport> {
    let raw: Value = serde_json::from_str(content).context("Input is not valid JSON")?;
    let batch = ResultSanitizer::new(config.limits).sanitize_raw(&raw);
    Ok(FootprintReport::from_batch(batch, 0))
}

pub fn cmd_sanitize(config: &EngineConfig, input: &Path, json: bool) -> Result<()> {
    let content = read_input(input)?;
    let report = sanitize_batch(config, &content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.results)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
