//! EcoMate Core Library
//!
//! Carbon footprint aggregation for activity records produced by an
//! external extraction service:
//! - Emission-factor reference table, loaded once at startup
//! - Footprint calculator (activity record → CO2e result)
//! - Result sanitizer enforcing per-item and batch caps
//! - Impact-level normalization
//! - Reports with category breakdown, equivalents and suggestions
//! - Extraction boundary (response parsing, pluggable backends)

pub mod calculator;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod factors;
pub mod insights;
pub mod models;
pub mod report;
pub mod sanitizer;

pub use calculator::{FootprintCalculator, SkipReason};
pub use config::{ConfigSource, EngineConfig, Limits, MAX_CO2E_PER_ITEM, MAX_TOTAL_CO2E};
pub use engine::FootprintEngine;
pub use error::{Error, Result};
pub use extraction::{
    emission_schema, parse_extraction_response, ExtractionService, MockExtractor,
};
pub use factors::{EmissionFactor, EmissionFactorTable};
pub use insights::{sustainability_suggestions, Equivalents};
pub use models::{ActivityRecord, ComputedResult, ImpactLevel};
pub use report::{CategoryTotal, FootprintReport};
pub use sanitizer::{sanitize, ResultSanitizer, SanitizedBatch};
