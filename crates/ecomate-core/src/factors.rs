//! Emission-factor reference table
//!
//! Loaded once at startup from a CSV file with (at least) the columns
//! `category, activity, unit, co2e_per_unit` and an optional `type`.
//! Any defect in the file is fatal: a partially loaded reference would
//! silently understate footprints.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub category: String,
    pub activity: String,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    pub unit: String,
    /// kg CO2e per `unit`
    pub co2e_per_unit: f64,
}

/// Immutable set of emission factors
#[derive(Debug, Clone)]
pub struct EmissionFactorTable {
    factors: Vec<EmissionFactor>,
    source: Option<PathBuf>,
}

impl EmissionFactorTable {
    /// Load the table from a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::FactorTable(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let mut table = Self::from_reader(file)
            .map_err(|e| Error::FactorTable(format!("{}: {}", path.display(), e)))?;
        table.source = Some(path.to_path_buf());
        info!(
            "Loaded {} emission factors from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a table from CSV data
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut factors = Vec::new();
        for (i, row) in rdr.deserialize::<EmissionFactor>().enumerate() {
            // Header is line 1
            let line = i + 2;
            let mut factor = row?;
            if factor.category.is_empty() || factor.activity.is_empty() {
                return Err(Error::FactorTable(format!(
                    "line {}: category and activity are required",
                    line
                )));
            }
            if !factor.co2e_per_unit.is_finite() || factor.co2e_per_unit < 0.0 {
                return Err(Error::FactorTable(format!(
                    "line {}: invalid co2e_per_unit {} for '{}'",
                    line, factor.co2e_per_unit, factor.activity
                )));
            }
            if factor.activity_type.as_deref() == Some("") {
                factor.activity_type = None;
            }
            factors.push(factor);
        }

        if factors.is_empty() {
            return Err(Error::FactorTable("no emission factors found".into()));
        }

        debug!("Parsed {} emission factors", factors.len());
        Ok(Self {
            factors,
            source: None,
        })
    }

    /// Build a table from already-validated factors
    pub fn from_factors(factors: Vec<EmissionFactor>) -> Self {
        Self {
            factors,
            source: None,
        }
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmissionFactor> {
        self.factors.iter()
    }

    /// File the table was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Distinct categories in table order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.factors
            .iter()
            .map(|f| f.category.as_str())
            .filter(|c| seen.insert(c.to_lowercase()))
            .collect()
    }

    /// Factors for a category (case-insensitive)
    pub fn for_category<'a>(
        &'a self,
        category: &str,
    ) -> impl Iterator<Item = &'a EmissionFactor> + 'a {
        let category = category.trim().to_lowercase();
        self.factors
            .iter()
            .filter(move |f| f.category.to_lowercase() == category)
    }

    /// Find the best factor for an activity description within a category
    ///
    /// Picks the factor whose activity words overlap most with the
    /// description's words. Ties go to the earlier row. `None` when no
    /// factor in the category shares a word with the description.
    pub fn find(&self, category: &str, description: &str) -> Option<&EmissionFactor> {
        let wanted = words(description);
        if wanted.is_empty() {
            return None;
        }

        let mut best: Option<(&EmissionFactor, usize)> = None;
        for factor in self.for_category(category) {
            let overlap = words(&factor.activity).intersection(&wanted).count();
            if overlap == 0 {
                continue;
            }
            if best.map_or(true, |(_, n)| overlap > n) {
                best = Some((factor, overlap));
            }
        }
        best.map(|(factor, _)| factor)
    }
}

fn words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
