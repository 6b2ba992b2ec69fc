//! EcoMate CLI - Carbon footprint aggregation
//!
//! Usage:
//!   ecomate analyze --input response.json   Report on an extractor response
//!   ecomate sanitize --input results.json   Bound a raw result batch
//!   ecomate factors --category Food         List emission factors
//!   ecomate config                          Show resolved configuration
//!   ecomate schema                          Print the extraction schema

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    if let Commands::Schema = cli.command {
        return commands::cmd_schema();
    }

    let config = commands::load_config(cli.config.as_deref(), cli.factors.as_deref())?;

    match cli.command {
        Commands::Analyze { input, json } => commands::cmd_analyze(&config, &input, json),
        Commands::Sanitize { input, json } => commands::cmd_sanitize(&config, &input, json),
        Commands::Factors { category } => commands::cmd_factors(&config, category.as_deref()),
        Commands::Config => commands::cmd_config(&config),
        Commands::Schema => commands::cmd_schema(),
    }
}
