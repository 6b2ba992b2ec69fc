//! Config and schema commands

use anyhow::Result;
use ecomate_core::config::{FACTORS_ENV, MAX_ITEM_ENV, MAX_TOTAL_ENV};
use ecomate_core::{emission_schema, EngineConfig};

pub fn cmd_config(config: &EngineConfig) -> Result<()> {
    println!("⚙️  EcoMate configuration");
    println!("   Source:            {}", config.source);
    println!();
    println!("   Factor table:      {}", config.factors_path.display());
    println!(
        "   Resolve missing:   {}",
        if config.resolve_missing { "yes" } else { "no" }
    );
    println!();
    println!(
        "   Max per item:      {} kg CO2e",
        config.limits.max_co2e_per_item
    );
    println!(
        "   Max per batch:     {} kg CO2e",
        config.limits.max_total_co2e
    );
    println!();
    println!(
        "   Environment overrides: {}, {}, {}",
        FACTORS_ENV, MAX_ITEM_ENV, MAX_TOTAL_ENV
    );
    Ok(())
}

pub fn cmd_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&emission_schema())?);
    Ok(())
}
