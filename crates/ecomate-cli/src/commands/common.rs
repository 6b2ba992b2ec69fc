//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration, applying CLI overrides
//! - `read_input` - Read a file or stdin
//! - `build_engine` - Construct the footprint engine

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use ecomate_core::{ComputedResult, EngineConfig, FootprintEngine, FootprintReport};

use super::truncate;

/// Resolve configuration; `--factors` wins over every other source
pub fn load_config(config_path: Option<&Path>, factors: Option<&Path>) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(path) = factors {
        config.factors_path = path.to_path_buf();
    }
    Ok(config)
}

/// Read a whole input file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn build_engine(config: &EngineConfig) -> Result<FootprintEngine> {
    FootprintEngine::new(config).with_context(|| {
        format!(
            "Failed to load emission factors from {}",
            config.factors_path.display()
        )
    })
}

/// Print a report in human-readable form
pub fn print_report(report: &FootprintReport) {
    if report.is_empty() {
        println!("🌱 No emissions detected");
        if report.skipped > 0 {
            println!("   ({} activities skipped)", report.skipped);
        }
        return;
    }

    println!("🌍 Carbon footprint: {:.2} kg CO2e", report.total_co2e);
    println!();
    for result in &report.results {
        print_result(result);
    }

    if report.skipped > 0 {
        println!();
        println!("   ⚠️  {} activities skipped", report.skipped);
    }
    if let Some(factor) = report.scale_factor {
        println!(
            "   ⚠️  Batch total exceeded the cap; scaled by {:.4}",
            factor
        );
    }

    println!();
    println!("📊 By category:");
    for total in &report.categories {
        println!(
            "   {:<12} {:>10.2} kg  {:>5.1}%  ({} items)",
            total.category,
            total.co2e,
            total.share * 100.0,
            total.count
        );
    }

    let eq = &report.equivalents;
    println!();
    println!("🔁 Equivalent to:");
    println!("   {:.3} smartphones manufactured", eq.smartphones);
    println!("   {:.3} t-shirts produced", eq.t_shirts);
    println!("   {:.1} km driven", eq.car_km);

    if !report.suggestions.is_empty() {
        println!();
        println!("💡 Suggestions:");
        for suggestion in &report.suggestions {
            println!("   - {}", suggestion);
        }
    }
}

fn print_result(result: &ComputedResult) {
    println!(
        "   {:<32} {:>10.2} kg  [{}]",
        truncate(&result.text, 32),
        result.co2e,
        result.co2e_impact_level
    );
    let mut detail = format!("{} {}", result.quantity, result.unit);
    if !result.activity_type.is_empty() {
        detail = format!("{} · {}", result.activity_type, detail);
    }
    println!(
        "     {} · {} × {} kg/unit",
        result.category,
        detail.trim(),
        result.co2e_per_unit
    );
}
