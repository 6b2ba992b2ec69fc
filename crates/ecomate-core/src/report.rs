//! Footprint reports
//!
//! A report is the request-scoped output handed to a presentation layer:
//! the sanitized results plus totals, a per-category breakdown, everyday
//! equivalents and suggestions. Everything is plain serde data.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::{sustainability_suggestions, Equivalents};
use crate::models::{ComputedResult, ImpactLevel};
use crate::sanitizer::SanitizedBatch;

/// Footprint attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub co2e: f64,
    /// Fraction of the report total (0.0 - 1.0)
    pub share: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ComputedResult>,
    /// kg CO2e
    pub total_co2e: f64,
    /// Records dropped before or during sanitizing
    pub skipped: usize,
    /// Present when the batch total was scaled down to the cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    pub categories: Vec<CategoryTotal>,
    pub equivalents: Equivalents,
    pub suggestions: Vec<String>,
}

impl FootprintReport {
    /// Build a report from a sanitized batch
    ///
    /// `dropped` counts records lost upstream of the sanitizer (e.g. by the
    /// calculator) and is added to the batch's own skip count.
    pub fn from_batch(batch: SanitizedBatch, dropped: usize) -> Self {
        let total_co2e = batch.total_co2e();
        let categories = category_totals(&batch.results, total_co2e);
        let suggestions = sustainability_suggestions(&batch.results);

        Self {
            generated_at: Utc::now(),
            total_co2e,
            skipped: batch.skipped + dropped,
            scale_factor: batch.scale_factor,
            categories,
            equivalents: Equivalents::from_total(total_co2e),
            suggestions,
            results: batch.results,
        }
    }

    /// Whether no emissions were detected
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results at or above an impact level, largest footprint first
    pub fn at_least(&self, level: ImpactLevel) -> Vec<&ComputedResult> {
        let mut hits: Vec<_> = self
            .results
            .iter()
            .filter(|r| r.co2e_impact_level >= level)
            .collect();
        hits.sort_by(|a, b| b.co2e.total_cmp(&a.co2e));
        hits
    }
}

/// Sum results per category, largest first (ties by name)
///
/// Categories group case-insensitively; the first spelling seen is kept.
pub fn category_totals(results: &[ComputedResult], total_co2e: f64) -> Vec<CategoryTotal> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for result in results {
        let key = result.category.trim().to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: result.category.clone(),
                co2e: 0.0,
                share: 0.0,
                count: 0,
            });
            totals.len() - 1
        });
        totals[slot].co2e += result.co2e;
        totals[slot].count += 1;
    }

    for total in &mut totals {
        total.share = if total_co2e > 0.0 {
            total.co2e / total_co2e
        } else {
            0.0
        };
    }

    totals.sort_by(|a, b| {
        b.co2e
            .total_cmp(&a.co2e)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}
