//! Result sanitizer
//!
//! Takes result batches from an untrusted or partially malformed source and
//! returns a batch that satisfies the engine invariants:
//! - every `co2e` is finite and within `[0, max_co2e_per_item]`
//! - the batch total never exceeds `max_total_co2e` (excess is removed by
//!   scaling every item by the same factor, preserving proportions)
//! - every impact level is canonical
//!
//! Sanitizing never fails. Bad entries are defaulted or skipped and logged.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::coerce;
use crate::config::Limits;
use crate::models::{
    ComputedResult, ImpactLevel, DEFAULT_SUGGESTION, UNKNOWN_ACTIVITY, UNKNOWN_CATEGORY,
};

/// Rounds of correction applied when float rounding leaves a scaled total
/// a hair above the cap
const MAX_SCALE_ROUNDS: usize = 4;

/// A sanitized batch plus what the sanitizer had to do to it
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedBatch {
    pub results: Vec<ComputedResult>,
    /// Entries dropped because they could not be read as results
    pub skipped: usize,
    /// Items whose `co2e` was clamped into range
    pub clamped: usize,
    /// Overall factor applied when the batch total exceeded the cap
    pub scale_factor: Option<f64>,
}

impl SanitizedBatch {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            skipped: 0,
            clamped: 0,
            scale_factor: None,
        }
    }

    pub fn total_co2e(&self) -> f64 {
        self.results.iter().map(|r| r.co2e).sum()
    }
}

/// Enforces per-item and batch caps on result batches
#[derive(Debug, Clone, Default)]
pub struct ResultSanitizer {
    limits: Limits,
}

impl ResultSanitizer {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Sanitize a raw JSON batch
    ///
    /// Anything other than a non-empty array yields an empty batch.
    pub fn sanitize(&self, raw: &Value) -> Vec<ComputedResult> {
        self.sanitize_raw(raw).results
    }

    /// Sanitize a raw JSON batch, reporting what was changed
    pub fn sanitize_raw(&self, raw: &Value) -> SanitizedBatch {
        let entries = match raw {
            Value::Array(entries) => entries,
            Value::Null => return SanitizedBatch::empty(),
            other => {
                warn!(kind = json_kind(other), "Result batch is not a list, ignoring");
                return SanitizedBatch::empty();
            }
        };

        let mut results = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for (index, entry) in entries.iter().enumerate() {
            let Value::Object(obj) = entry else {
                warn!(index, kind = json_kind(entry), "Skipping non-object result entry");
                skipped += 1;
                continue;
            };
            match read_result(obj) {
                Ok(result) => results.push(result),
                Err(reason) => {
                    warn!(index, reason = %reason, "Skipping malformed result entry");
                    skipped += 1;
                }
            }
        }

        let mut batch = self.sanitize_results(results);
        batch.skipped = skipped;
        batch
    }

    /// Enforce caps on an already-typed batch (e.g. calculator output)
    pub fn sanitize_results(&self, mut results: Vec<ComputedResult>) -> SanitizedBatch {
        let mut clamped = 0;
        for result in &mut results {
            let bounded = self.clamp_item(result.co2e);
            if bounded != result.co2e {
                debug!(
                    activity = %result.text,
                    raw = result.co2e,
                    clamped = bounded,
                    "Clamped co2e into range"
                );
                result.co2e = bounded;
                clamped += 1;
            }
        }

        let scale_factor = self.scale_to_cap(&mut results);

        SanitizedBatch {
            results,
            skipped: 0,
            clamped,
            scale_factor,
        }
    }

    fn clamp_item(&self, co2e: f64) -> f64 {
        coerce::non_negative(co2e).min(self.limits.max_co2e_per_item)
    }

    /// Scale every item down by the same factor if the total exceeds the cap
    ///
    /// Returns the overall factor applied, if any.
    fn scale_to_cap(&self, results: &mut [ComputedResult]) -> Option<f64> {
        let cap = self.limits.max_total_co2e;
        let total: f64 = results.iter().map(|r| r.co2e).sum();
        if total <= cap {
            return None;
        }

        let mut applied = 1.0;
        let mut current = total;
        for round in 0..MAX_SCALE_ROUNDS {
            let mut factor = cap / current;
            if round > 0 {
                // Nudge below the cap when the previous round overshot
                factor *= 1.0 - f64::EPSILON * 4.0;
            }
            for result in results.iter_mut() {
                result.co2e *= factor;
            }
            applied *= factor;
            current = results.iter().map(|r| r.co2e).sum();
            if current <= cap {
                break;
            }
        }

        warn!(
            total,
            cap,
            scale = applied,
            "Batch total exceeds cap, scaled results down"
        );
        Some(applied)
    }
}

/// Sanitize a raw batch with the default limits
pub fn sanitize(raw: &Value) -> Vec<ComputedResult> {
    ResultSanitizer::default().sanitize(raw)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read one text field, following a fallback chain of keys
///
/// Scalars are rendered as text; blank strings and null fall through to the
/// next key. A container in a text field makes the whole entry unreadable.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Result<Option<String>, String> {
    for key in keys {
        match obj.get(*key) {
            None | Some(Value::Null) => continue,
            Some(v @ (Value::Array(_) | Value::Object(_))) => {
                return Err(format!("field '{}' is {}, expected text", key, json_kind(v)));
            }
            Some(v) => {
                if let Some(label) = coerce::json_to_label(v) {
                    return Ok(Some(label));
                }
            }
        }
    }
    Ok(None)
}

fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key)
        .and_then(coerce::json_to_f64)
        .map(coerce::non_negative)
        .unwrap_or(0.0)
}

fn read_result(obj: &Map<String, Value>) -> Result<ComputedResult, String> {
    let text = text_field(obj, &["text", "activity"])?.unwrap_or_else(|| UNKNOWN_ACTIVITY.into());
    let category = text_field(obj, &["category"])?.unwrap_or_else(|| UNKNOWN_CATEGORY.into());
    let activity_type = text_field(obj, &["type", "type_obj"])?.unwrap_or_default();
    let unit = text_field(obj, &["unit"])?.unwrap_or_default();
    let impact = text_field(obj, &["co2e_impact_level"])?;
    let suggestion =
        text_field(obj, &["suggestion"])?.unwrap_or_else(|| DEFAULT_SUGGESTION.into());

    Ok(ComputedResult {
        text,
        category,
        activity_type,
        quantity: number_field(obj, "quantity"),
        unit,
        co2e_per_unit: number_field(obj, "co2e_per_unit"),
        co2e: number_field(obj, "co2e"),
        co2e_impact_level: ImpactLevel::normalize(impact.as_deref()),
        suggestion,
    })
}
