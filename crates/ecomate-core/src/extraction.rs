//! Extraction service boundary
//!
//! Activity extraction from free text is done by an external generative
//! model. This module owns the contract with it:
//! - `emission_schema()`: the JSON schema the model is asked to follow
//! - `parse_extraction_response()`: turns a raw model response into
//!   `ActivityRecord`s, tolerating prose around the JSON payload and
//!   individual malformed entries
//! - `ExtractionService`: the pluggable backend trait, with `MockExtractor`
//!   for tests and offline use

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::ActivityRecord;

/// Key wrapping the record list in schema-conforming responses
pub const RECORDS_KEY: &str = "emission_record";

/// Maximum characters of a raw response quoted in error messages
const RAW_PREVIEW_CHARS: usize = 200;

/// JSON schema handed to the extraction model
pub fn emission_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            RECORDS_KEY: {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": {"type": "string"},
                        "type_obj": {"type": "string"},
                        "activity": {"type": "string"},
                        "quantity": {"type": "number"},
                        "unit": {"type": "string"},
                        "co2e_per_unit": {"type": "number"},
                        "co2e_impact_level": {"type": "string"},
                        "suggestion": {"type": "string"}
                    },
                    "required": [
                        "category", "activity", "type_obj", "unit", "quantity",
                        "co2e_per_unit", "co2e_impact_level", "suggestion"
                    ]
                }
            }
        },
        "required": [RECORDS_KEY]
    })
}

fn preview(response: &str) -> String {
    if response.chars().count() > RAW_PREVIEW_CHARS {
        let head: String = response.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        response.to_string()
    }
}

/// Outermost `open`..`close` span of a model response
fn json_span(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let end = response.rfind(close)?;
    (start < end).then(|| &response[start..=end])
}

/// Locate and parse the JSON payload in a model response
///
/// The object span is tried first, so brackets in surrounding prose do not
/// hide it; the array span is the fallback for bare-list responses.
fn locate_payload(response: &str) -> Result<Value> {
    let spans = [json_span(response, '{', '}'), json_span(response, '[', ']')];
    let mut first_error = None;
    for span in spans.into_iter().flatten() {
        match serde_json::from_str::<Value>(span) {
            Ok(payload) => return Ok(payload),
            Err(e) => {
                first_error.get_or_insert((e, span));
            }
        }
    }

    match first_error {
        Some((e, span)) => Err(Error::InvalidData(format!(
            "Invalid JSON from extractor: {} | Raw: {}",
            e,
            preview(span)
        ))),
        None => Err(Error::InvalidData(format!(
            "No JSON found in extraction response | Raw: {}",
            preview(response)
        ))),
    }
}

/// Parse activity records from an extraction model response
///
/// Accepts `{"emission_record": [...]}` or a bare array. Entries that are
/// not objects or do not fit the record shape are skipped with a warning.
/// A response with no JSON payload at all is an error.
pub fn parse_extraction_response(response: &str) -> Result<Vec<ActivityRecord>> {
    let payload = locate_payload(response.trim())?;

    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => match obj.remove(RECORDS_KEY) {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(Error::InvalidData(format!(
                    "'{}' is not a list in extraction response",
                    RECORDS_KEY
                )))
            }
        },
        _ => {
            return Err(Error::InvalidData(
                "Extraction response is neither an object nor a list".into(),
            ))
        }
    };

    let total = entries.len();
    let records: Vec<ActivityRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                warn!(index, "Skipping non-object extraction entry");
                return None;
            }
            match serde_json::from_value::<ActivityRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed extraction entry");
                    None
                }
            }
        })
        .collect();

    debug!("Parsed {} of {} extracted activities", records.len(), total);
    Ok(records)
}

/// Trait for extraction backends
///
/// Implementations call out to a generative model (or any other source)
/// and return candidate records. Backends should be Send + Sync to allow
/// use across async tasks.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract activity records from raw text, optionally grounded on
    /// reference documents (e.g. an emission-factor sheet)
    async fn extract(&self, text: &str, context_files: &[PathBuf]) -> Result<Vec<ActivityRecord>>;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}

/// Mock extractor for testing
///
/// Returns a fixed set of records, or a fixed failure.
#[derive(Clone, Default)]
pub struct MockExtractor {
    records: Vec<ActivityRecord>,
    failure: Option<String>,
}

impl MockExtractor {
    /// Extractor that returns the given records for any input
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self {
            records,
            failure: None,
        }
    }

    /// Extractor that replays a canned model response
    pub fn from_response(response: &str) -> Result<Self> {
        Ok(Self::new(parse_extraction_response(response)?))
    }

    /// Extractor whose every call fails
    pub fn failing(message: &str) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ExtractionService for MockExtractor {
    async fn extract(
        &self,
        text: &str,
        _context_files: &[PathBuf],
    ) -> Result<Vec<ActivityRecord>> {
        if let Some(ref message) = self.failure {
            return Err(Error::Extraction(message.clone()));
        }
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
