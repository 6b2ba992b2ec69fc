//! Sustainability suggestions and everyday equivalents

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::ComputedResult;

/// kg CO2e to manufacture one smartphone
pub const SMARTPHONE_KG: f64 = 404.0;

/// kg CO2e to manufacture one t-shirt
pub const T_SHIRT_KG: f64 = 190.0;

/// kg CO2e per kilometre driven in an average car
pub const CAR_KG_PER_KM: f64 = 0.2;

/// Per-category threshold (kg CO2e per activity) above which a suggestion
/// is offered
const SUGGESTION_RULES: &[(&str, f64, &str)] = &[
    (
        "food",
        1.0,
        "Consider plant-based alternatives for high-carbon foods",
    ),
    (
        "transport",
        0.5,
        "Try using public transit or carpooling for your commute",
    ),
    (
        "energy",
        0.3,
        "Consider using energy-efficient appliances and turning off devices when not in use",
    ),
    (
        "shopping",
        0.1,
        "Consider buying second-hand or sustainable products",
    ),
];

/// Category-level suggestions for a batch, in order of first trigger
pub fn sustainability_suggestions(results: &[ComputedResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for result in results {
        let category = result.category.trim().to_lowercase();
        let rule = SUGGESTION_RULES
            .iter()
            .find(|(name, threshold, _)| *name == category && result.co2e > *threshold);
        if let Some((name, _, text)) = rule {
            if seen.insert(*name) {
                suggestions.push(text.to_string());
            }
        }
    }

    suggestions
}

/// A footprint expressed in everyday terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equivalents {
    pub smartphones: f64,
    pub t_shirts: f64,
    pub car_km: f64,
}

impl Equivalents {
    pub fn from_total(total_co2e: f64) -> Self {
        Self {
            smartphones: total_co2e / SMARTPHONE_KG,
            t_shirts: total_co2e / T_SHIRT_KG,
            car_km: total_co2e / CAR_KG_PER_KM,
        }
    }
}
