//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// EcoMate - Turn everyday activities into a carbon footprint
#[derive(Parser)]
#[command(name = "ecomate")]
#[command(about = "Carbon footprint aggregation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emission-factor CSV (overrides the configured table)
    #[arg(long, global = true)]
    pub factors: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a footprint report from an extraction response
    Analyze {
        /// Extractor response file (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and bound a raw batch of computed results
    Sanitize {
        /// JSON result batch (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the emission-factor reference table
    Factors {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the resolved configuration
    Config,

    /// Print the JSON schema handed to the extraction model
    Schema,
}
