//! Domain models for EcoMate

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::coerce;

/// Description used when a result carries neither `text` nor `activity`
pub const UNKNOWN_ACTIVITY: &str = "Unknown Activity";

/// Category used when a record or result has none
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Suggestion used when the extractor gave none
pub const DEFAULT_SUGGESTION: &str = "Consider more sustainable alternatives for this activity.";

/// Coarse four-tier classification of an activity's footprint
///
/// Serialized in its canonical display form (`"LOW"` .. `"VERY HIGH"`).
/// Missing or unrecognized input normalizes to [`ImpactLevel::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[default]
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY HIGH",
        }
    }

    /// Numeric tier (1 = low .. 4 = very high)
    pub fn tier(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
        }
    }

    pub fn all() -> &'static [ImpactLevel] {
        &[Self::Low, Self::Medium, Self::High, Self::VeryHigh]
    }

    /// Normalize a free-form label, falling back to the default level
    pub fn normalize(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }

    /// Normalize a JSON impact hint (`"very_high"`, `"3"`, `4`, ...)
    pub fn from_json(value: Option<&Value>) -> Self {
        let label = value.and_then(coerce::json_to_label);
        Self::normalize(label.as_deref())
    }
}

impl FromStr for ImpactLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "low" => Ok(Self::Low),
            "2" | "medium" => Ok(Self::Medium),
            "3" | "high" => Ok(Self::High),
            "4" | "very high" | "very_high" => Ok(Self::VeryHigh),
            _ => Err(format!("Unknown impact level: {}", s)),
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate activity as produced by the extraction service
///
/// Numeric and impact fields stay as raw JSON until the calculator coerces
/// them, since extractors emit numbers, numeric strings and `"NA"` markers
/// interchangeably. Both spellings of the description (`text`/`activity`)
/// and of the sub-type (`type`/`type_obj`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_obj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2e_per_unit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2e_impact_level: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggestion: Option<String>,
}

/// Text field that also accepts scalar numbers and booleans
///
/// Extractors sometimes emit `"unit": 5` or `"type_obj": 3`; those render as
/// text instead of rejecting the record. Containers are still an error.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(_)) | Some(Value::Object(_)) => {
            Err(de::Error::custom("expected text, found a list or object"))
        }
        Some(value) => Ok(coerce::json_to_label(&value)),
        None => Ok(None),
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ActivityRecord {
    pub fn new(category: &str, activity: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            activity: Some(activity.to_string()),
            ..Default::default()
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(Value::from(quantity));
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_factor(mut self, co2e_per_unit: f64) -> Self {
        self.co2e_per_unit = Some(Value::from(co2e_per_unit));
        self
    }

    pub fn with_impact(mut self, level: &str) -> Self {
        self.co2e_impact_level = Some(Value::from(level));
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Description: `text`, then `activity`
    pub fn description(&self) -> Option<&str> {
        non_blank(&self.text).or_else(|| non_blank(&self.activity))
    }

    /// Sub-type: `type`, then `type_obj`
    pub fn kind(&self) -> Option<&str> {
        non_blank(&self.activity_type).or_else(|| non_blank(&self.type_obj))
    }

    pub fn category_name(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    pub fn unit_name(&self) -> Option<&str> {
        non_blank(&self.unit)
    }

    pub fn impact_level(&self) -> ImpactLevel {
        ImpactLevel::from_json(self.co2e_impact_level.as_ref())
    }
}

/// Emission result for one activity
///
/// Field names match the JSON shape consumed by presentation layers, so a
/// batch serializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedResult {
    pub text: String,
    pub category: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub quantity: f64,
    pub unit: String,
    pub co2e_per_unit: f64,
    /// kg CO2e
    pub co2e: f64,
    pub co2e_impact_level: ImpactLevel,
    pub suggestion: String,
}
