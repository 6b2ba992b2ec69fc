//! Error types for EcoMate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Emission factor table error: {0}")]
    FactorTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Extraction error: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
