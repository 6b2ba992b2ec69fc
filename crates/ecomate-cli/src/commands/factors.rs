//! Factors command: list the emission-factor reference table

use anyhow::{bail, Context, Result};
use ecomate_core::{EmissionFactorTable, EngineConfig};

use super::truncate;

pub fn cmd_factors(config: &EngineConfig, category: Option<&str>) -> Result<()> {
    let table = EmissionFactorTable::load(&config.factors_path).with_context(|| {
        format!(
            "Failed to load emission factors from {}",
            config.factors_path.display()
        )
    })?;

    let categories: Vec<&str> = match category {
        Some(wanted) => {
            let found = table
                .categories()
                .into_iter()
                .find(|c| c.eq_ignore_ascii_case(wanted.trim()));
            match found {
                Some(c) => vec![c],
                None => bail!(
                    "Unknown category '{}'. Available: {}",
                    wanted,
                    table.categories().join(", ")
                ),
            }
        }
        None => table.categories(),
    };

    println!(
        "📋 Emission factors ({} entries from {})",
        table.len(),
        config.factors_path.display()
    );

    for name in categories {
        println!();
        println!("{}:", name);
        for factor in table.for_category(name) {
            println!(
                "   {:<36} {:>8} kg CO2e/{}",
                truncate(&factor.activity, 36),
                factor.co2e_per_unit,
                factor.unit
            );
        }
    }

    Ok(())
}
