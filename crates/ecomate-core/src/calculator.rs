//! Footprint calculator
//!
//! Converts extractor activity records into CO2e results. Each record is
//! handled on its own: a defective record is logged and dropped, never
//! failing the batch. A record without a usable emission factor is dropped
//! rather than counted as zero, since a missing factor says nothing about
//! the activity's emissions.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce;
use crate::error::Result;
use crate::factors::{EmissionFactor, EmissionFactorTable};
use crate::models::{
    ActivityRecord, ComputedResult, DEFAULT_SUGGESTION, UNKNOWN_ACTIVITY, UNKNOWN_CATEGORY,
};

/// Why a record produced no result
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// `co2e_per_unit` absent, null, or a "not available" marker
    MissingFactor,
    /// `co2e_per_unit` present but not a finite non-negative number
    InvalidFactor(String),
    /// `quantity` present but not a number
    InvalidQuantity(String),
    /// `quantity * co2e_per_unit` is not finite
    Overflow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFactor => write!(f, "no emission factor"),
            Self::InvalidFactor(raw) => write!(f, "invalid emission factor: {}", raw),
            Self::InvalidQuantity(raw) => write!(f, "invalid quantity: {}", raw),
            Self::Overflow => write!(f, "co2e is not finite"),
        }
    }
}

/// Computes CO2e for activity records
///
/// Holds the emission-factor reference, loaded once and read-only after
/// construction.
#[derive(Debug, Clone)]
pub struct FootprintCalculator {
    factors: EmissionFactorTable,
    resolve_missing: bool,
}

impl FootprintCalculator {
    pub fn new(factors: EmissionFactorTable) -> Self {
        Self {
            factors,
            resolve_missing: false,
        }
    }

    /// Load the reference table from disk; fails immediately if it cannot
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(EmissionFactorTable::load(path)?))
    }

    /// Fill missing emission factors from the reference table
    pub fn with_resolve_missing(mut self, resolve: bool) -> Self {
        self.resolve_missing = resolve;
        self
    }

    pub fn factors(&self) -> &EmissionFactorTable {
        &self.factors
    }

    /// Compute results for a batch of records
    ///
    /// An empty output is valid: it means no record had a usable factor.
    pub fn compute(&self, activities: &[ActivityRecord]) -> Vec<ComputedResult> {
        let mut results = Vec::with_capacity(activities.len());
        for (index, record) in activities.iter().enumerate() {
            match self.compute_one(record) {
                Ok(result) => results.push(result),
                Err(reason) => warn!(
                    index,
                    activity = record.description().unwrap_or(UNKNOWN_ACTIVITY),
                    reason = %reason,
                    "Skipping activity"
                ),
            }
        }

        if results.is_empty() && !activities.is_empty() {
            warn!(
                "No carbon footprint calculations were successful for {} activities",
                activities.len()
            );
        }
        debug!(
            "Computed {} of {} activities",
            results.len(),
            activities.len()
        );
        results
    }

    /// Compute the result for a single record
    pub fn compute_one(
        &self,
        record: &ActivityRecord,
    ) -> std::result::Result<ComputedResult, SkipReason> {
        let mut unit = record.unit_name().map(str::to_string);

        let co2e_per_unit = match emission_factor(record.co2e_per_unit.as_ref()) {
            Ok(factor) => factor,
            Err(SkipReason::MissingFactor) if self.resolve_missing => {
                let factor = self.lookup_factor(record).ok_or(SkipReason::MissingFactor)?;
                if unit.is_none() {
                    unit = Some(factor.unit.clone());
                }
                factor.co2e_per_unit
            }
            Err(reason) => return Err(reason),
        };

        let quantity = quantity(record.quantity.as_ref())?;
        let co2e = quantity * co2e_per_unit;
        if !co2e.is_finite() {
            return Err(SkipReason::Overflow);
        }

        Ok(ComputedResult {
            text: record.description().unwrap_or(UNKNOWN_ACTIVITY).to_string(),
            category: record.category_name().unwrap_or(UNKNOWN_CATEGORY).to_string(),
            activity_type: record.kind().unwrap_or_default().to_string(),
            quantity,
            unit: unit.unwrap_or_default(),
            co2e_per_unit,
            co2e,
            co2e_impact_level: record.impact_level(),
            suggestion: record
                .suggestion
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SUGGESTION)
                .to_string(),
        })
    }

    fn lookup_factor(&self, record: &ActivityRecord) -> Option<&EmissionFactor> {
        let category = record.category_name()?;
        let description = record.description()?;
        let factor = self.factors.find(category, description)?;
        debug!(
            activity = description,
            matched = %factor.activity,
            co2e_per_unit = factor.co2e_per_unit,
            "Resolved missing emission factor from reference table"
        );
        Some(factor)
    }
}

fn raw_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn emission_factor(value: Option<&Value>) -> std::result::Result<f64, SkipReason> {
    let value = match value {
        None | Some(Value::Null) => return Err(SkipReason::MissingFactor),
        Some(Value::String(s)) if coerce::is_not_available(s) => {
            return Err(SkipReason::MissingFactor)
        }
        Some(v) => v,
    };
    match coerce::json_to_f64(value) {
        Some(f) if f >= 0.0 => Ok(f),
        _ => Err(SkipReason::InvalidFactor(raw_label(value))),
    }
}

/// Missing quantity counts as zero; negative quantities clamp to zero
fn quantity(value: Option<&Value>) -> std::result::Result<f64, SkipReason> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => match coerce::json_to_f64(v) {
            Some(q) => {
                if q < 0.0 {
                    warn!(quantity = q, "Negative quantity clamped to zero");
                }
                Ok(coerce::non_negative(q))
            }
            None => Err(SkipReason::InvalidQuantity(raw_label(v))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImpactLevel;
    use serde_json::json;

    const FACTORS: &str = "category,activity,type,unit,co2e_per_unit
Food,beef steak burger,meat,kg,27.0
Transport,uber taxi cab ride,taxi,km,0.2
";

    fn calculator() -> FootprintCalculator {
        FootprintCalculator::new(EmissionFactorTable::from_reader(FACTORS.as_bytes()).unwrap())
    }

    fn record(value: serde_json::Value) -> ActivityRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_uber_ride() {
        let results = calculator().compute(&[record(json!({
            "category": "Transport",
            "activity": "Uber ride",
            "quantity": 10,
            "unit": "km",
            "co2e_per_unit": 0.2
        }))]);
        assert_eq!(results.len(), 1);
        assert!((results[0].co2e - 2.0).abs() < 1e-12);
        assert_eq!(results[0].text, "Uber ride");
        assert_eq!(results[0].unit, "km");
        assert_eq!(results[0].co2e_impact_level, ImpactLevel::Low);
        assert_eq!(results[0].suggestion, DEFAULT_SUGGESTION);
    }

    #[test]
    fn test_not_available_factor_dropped() {
        let results = calculator().compute(&[record(json!({
            "category": "Food",
            "activity": "steak",
            "quantity": 1,
            "co2e_per_unit": "NA"
        }))]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_skip_reasons() {
        let calc = calculator();
        let missing = ActivityRecord::new("Food", "steak").with_quantity(1.0);
        assert_eq!(calc.compute_one(&missing), Err(SkipReason::MissingFactor));

        let null = record(json!({"activity": "x", "co2e_per_unit": null}));
        assert_eq!(calc.compute_one(&null), Err(SkipReason::MissingFactor));

        let bad = record(json!({"activity": "x", "co2e_per_unit": "lots"}));
        assert_eq!(
            calc.compute_one(&bad),
            Err(SkipReason::InvalidFactor("lots".into()))
        );

        let negative = record(json!({"activity": "x", "co2e_per_unit": -2}));
        assert!(matches!(
            calc.compute_one(&negative),
            Err(SkipReason::InvalidFactor(_))
        ));

        let bad_quantity = record(json!({"activity": "x", "quantity": "some", "co2e_per_unit": 1}));
        assert_eq!(
            calc.compute_one(&bad_quantity),
            Err(SkipReason::InvalidQuantity("some".into()))
        );

        let overflow = ActivityRecord::new("Energy", "x")
            .with_quantity(f64::MAX)
            .with_factor(10.0);
        assert_eq!(calc.compute_one(&overflow), Err(SkipReason::Overflow));
    }

    #[test]
    fn test_bad_record_does_not_abort_batch() {
        let results = calculator().compute(&[
            ActivityRecord::new("Food", "steak").with_quantity(1.0),
            ActivityRecord::new("Transport", "bus").with_quantity(5.0).with_factor(0.1),
            record(json!({"activity": "x", "quantity": [1], "co2e_per_unit": 1})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "bus");
    }

    #[test]
    fn test_zero_quantity_included() {
        let results = calculator().compute(&[ActivityRecord::new("Food", "salad")
            .with_quantity(0.0)
            .with_factor(2.0)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].co2e, 0.0);
    }

    #[test]
    fn test_missing_quantity_is_zero() {
        let results = calculator().compute(&[ActivityRecord::new("Food", "salad").with_factor(2.0)]);
        assert_eq!(results[0].quantity, 0.0);
        assert_eq!(results[0].co2e, 0.0);
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let results = calculator().compute(&[ActivityRecord::new("Food", "salad")
            .with_quantity(-3.0)
            .with_factor(2.0)]);
        assert_eq!(results[0].quantity, 0.0);
        assert_eq!(results[0].co2e, 0.0);
    }

    #[test]
    fn test_string_numbers_coerced() {
        let results = calculator().compute(&[record(json!({
            "category": "Energy",
            "text": "AC for 5 hours",
            "quantity": "5",
            "unit": "hour",
            "co2e_per_unit": "1.5",
            "co2e_impact_level": "HIGH"
        }))]);
        assert!((results[0].co2e - 7.5).abs() < 1e-12);
        assert_eq!(results[0].co2e_impact_level, ImpactLevel::High);
    }

    #[test]
    fn test_decimal_comma_numbers_skipped() {
        let calc = calculator();
        let both = record(json!({"activity": "x", "quantity": "1,5", "co2e_per_unit": "0,2"}));
        assert_eq!(
            calc.compute_one(&both),
            Err(SkipReason::InvalidFactor("0,2".into()))
        );

        let quantity = record(json!({"activity": "x", "quantity": "1,5", "co2e_per_unit": 2}));
        assert_eq!(
            calc.compute_one(&quantity),
            Err(SkipReason::InvalidQuantity("1,5".into()))
        );

        let grouped = record(json!({"activity": "x", "quantity": "1,200", "co2e_per_unit": "0.5"}));
        assert!((calc.compute_one(&grouped).unwrap().co2e - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_fields_carried_through() {
        let results = calculator().compute(&[record(json!({
            "category": "Food",
            "type_obj": "meat",
            "activity": "beef burger",
            "quantity": 0.25,
            "unit": "kg",
            "co2e_per_unit": 27,
            "co2e_impact_level": "very_high",
            "suggestion": "Try a bean burger"
        }))]);
        let r = &results[0];
        assert_eq!(r.category, "Food");
        assert_eq!(r.activity_type, "meat");
        assert_eq!(r.co2e_impact_level, ImpactLevel::VeryHigh);
        assert_eq!(r.suggestion, "Try a bean burger");
        assert!((r.co2e - 6.75).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_category_tolerated() {
        let results = calculator().compute(&[ActivityRecord::new("Pets", "dog food")
            .with_quantity(2.0)
            .with_factor(3.0)]);
        assert_eq!(results[0].category, "Pets");

        let results = calculator().compute(&[ActivityRecord::default().with_factor(1.0)]);
        assert_eq!(results[0].category, UNKNOWN_CATEGORY);
        assert_eq!(results[0].text, UNKNOWN_ACTIVITY);
    }

    #[test]
    fn test_resolve_missing_from_table() {
        let calc = calculator().with_resolve_missing(true);
        let results = calc.compute(&[
            record(json!({"category": "Food", "activity": "steak", "quantity": 0.5, "co2e_per_unit": "NA"})),
            record(json!({"category": "Food", "activity": "tofu", "quantity": 1})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].unit, "kg");
        assert!((results[0].co2e - 13.5).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_missing_keeps_invalid_factor_dropped() {
        let calc = calculator().with_resolve_missing(true);
        let bad = record(json!({"category": "Food", "activity": "steak", "co2e_per_unit": "lots"}));
        assert!(matches!(
            calc.compute_one(&bad),
            Err(SkipReason::InvalidFactor(_))
        ));
    }

    #[test]
    fn test_empty_batch() {
        assert!(calculator().compute(&[]).is_empty());
    }
}
