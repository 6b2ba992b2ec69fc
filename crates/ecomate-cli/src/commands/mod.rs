//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (load_config, read_input, build_engine)
//! - `analyze` - Footprint report from an extraction response
//! - `sanitize` - Bounding a raw result batch
//! - `factors` - Emission-factor table listing
//! - `config` - Configuration and schema display

pub mod analyze;
pub mod common;
pub mod config;
pub mod factors;
pub mod sanitize;

// Re-export command functions for main.rs
pub use analyze::*;
pub use common::*;
pub use config::*;
pub use factors::*;
pub use sanitize::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
