//! Engine configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. Explicit path (e.g. `--config`), which must exist
//! 2. User override in the config dir (~/.config/ecomate/config.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `ECOMATE_FACTORS`: emission-factor table path
//! - `ECOMATE_MAX_CO2E_PER_ITEM`: per-item cap (kg CO2e)
//! - `ECOMATE_MAX_TOTAL_CO2E`: batch cap (kg CO2e)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ecomate.toml");

pub const FACTORS_ENV: &str = "ECOMATE_FACTORS";
pub const MAX_ITEM_ENV: &str = "ECOMATE_MAX_CO2E_PER_ITEM";
pub const MAX_TOTAL_ENV: &str = "ECOMATE_MAX_TOTAL_CO2E";

/// Default per-item cap in kg CO2e
pub const MAX_CO2E_PER_ITEM: f64 = 10_000.0;

/// Default batch cap in kg CO2e
pub const MAX_TOTAL_CO2E: f64 = 1_000_000.0;

/// Abuse/overflow guards applied to every result batch
///
/// These bound a misbehaving extractor; they are not domain ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub max_co2e_per_item: f64,
    pub max_total_co2e: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_co2e_per_item: MAX_CO2E_PER_ITEM,
            max_total_co2e: MAX_TOTAL_CO2E,
        }
    }
}

impl Limits {
    pub fn new(max_co2e_per_item: f64, max_total_co2e: f64) -> Result<Self> {
        let limits = Self {
            max_co2e_per_item,
            max_total_co2e,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_co2e_per_item", self.max_co2e_per_item),
            ("max_total_co2e", self.max_total_co2e),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserOverride(PathBuf),
    Embedded,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{}", p.display()),
            Self::UserOverride(p) => write!(f, "{} (user override)", p.display()),
            Self::Embedded => write!(f, "built-in defaults"),
        }
    }
}

/// Resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Emission-factor reference table
    pub factors_path: PathBuf,
    /// Fill missing emission factors from the reference table
    pub resolve_missing: bool,
    pub limits: Limits,
    pub source: ConfigSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            factors_path: PathBuf::from("data/emission_factors.csv"),
            resolve_missing: false,
            limits: Limits::default(),
            source: ConfigSource::Embedded,
        }
    }
}

impl EngineConfig {
    /// Load configuration and apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = load_file(explicit)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.limits.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML content (no environment overrides)
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = parse_config(content, None)?;
        config.limits.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(FACTORS_ENV).filter(|p| !p.trim().is_empty()) {
            debug!(path = %path, "Factor table overridden from environment");
            self.factors_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(MAX_ITEM_ENV) {
            self.limits.max_co2e_per_item = parse_limit(MAX_ITEM_ENV, &raw)?;
        }
        if let Some(raw) = lookup(MAX_TOTAL_ENV) {
            self.limits.max_total_co2e = parse_limit(MAX_TOTAL_ENV, &raw)?;
        }
        Ok(())
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{} is not a number: {}", key, raw)))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ecomate").join("config.toml"))
}

fn load_file(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let mut config = parse_config(&content, path.parent())?;
        config.source = ConfigSource::Explicit(path.to_path_buf());
        return Ok(config);
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config = parse_config(&content, path.parent())?;
            config.source = ConfigSource::UserOverride(path);
            return Ok(config);
        }
    }

    parse_config(DEFAULT_CONFIG, None)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    factors: Option<RawFactors>,
    limits: Option<RawLimits>,
}

#[derive(Debug, Deserialize)]
struct RawFactors {
    path: Option<PathBuf>,
    resolve_missing: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawLimits {
    max_co2e_per_item: Option<f64>,
    max_total_co2e: Option<f64>,
}

/// Parse config from TOML content
///
/// Relative factor paths in a config file resolve against the file's
/// directory; the embedded default stays relative to the working directory.
fn parse_config(content: &str, base_dir: Option<&Path>) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = EngineConfig::default();

    if let Some(factors) = raw.factors {
        if let Some(path) = factors.path {
            config.factors_path = match base_dir {
                Some(base) if path.is_relative() => base.join(path),
                _ => path,
            };
        }
        if let Some(resolve) = factors.resolve_missing {
            config.resolve_missing = resolve;
        }
    }

    if let Some(limits) = raw.limits {
        if let Some(max) = limits.max_co2e_per_item {
            config.limits.max_co2e_per_item = max;
        }
        if let Some(max) = limits.max_total_co2e {
            config.limits.max_total_co2e = max;
        }
    }

    Ok(config)
}
