//! Footprint engine: calculator + sanitizer + reporting
//!
//! The engine holds no per-request state. One instance (loaded at startup)
//! can serve any number of independent batches, from any thread.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::calculator::FootprintCalculator;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::extraction::ExtractionService;
use crate::models::ActivityRecord;
use crate::report::FootprintReport;
use crate::sanitizer::ResultSanitizer;

pub struct FootprintEngine {
    calculator: FootprintCalculator,
    sanitizer: ResultSanitizer,
}

impl FootprintEngine {
    /// Build an engine from configuration
    ///
    /// Loads the emission-factor table; any failure here is fatal.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.limits.validate()?;
        let calculator = FootprintCalculator::from_path(&config.factors_path)?
            .with_resolve_missing(config.resolve_missing);
        info!(
            factors = calculator.factors().len(),
            max_co2e_per_item = config.limits.max_co2e_per_item,
            max_total_co2e = config.limits.max_total_co2e,
            "Footprint engine ready"
        );
        Ok(Self::with_parts(calculator, ResultSanitizer::new(config.limits)))
    }

    pub fn with_parts(calculator: FootprintCalculator, sanitizer: ResultSanitizer) -> Self {
        Self {
            calculator,
            sanitizer,
        }
    }

    pub fn calculator(&self) -> &FootprintCalculator {
        &self.calculator
    }

    pub fn sanitizer(&self) -> &ResultSanitizer {
        &self.sanitizer
    }

    /// Compute, bound and summarize a batch of activity records
    pub fn process(&self, records: &[ActivityRecord]) -> FootprintReport {
        let results = self.calculator.compute(records);
        let dropped = records.len() - results.len();
        let batch = self.sanitizer.sanitize_results(results);
        debug!(
            records = records.len(),
            dropped,
            clamped = batch.clamped,
            scaled = batch.scale_factor.is_some(),
            "Processed activity batch"
        );
        FootprintReport::from_batch(batch, dropped)
    }

    /// Extract activities from text and report on them
    ///
    /// Extraction failures propagate as errors. An extraction that finds
    /// nothing yields an empty report.
    pub async fn analyze_text(
        &self,
        extractor: &dyn ExtractionService,
        text: &str,
        context_files: &[PathBuf],
    ) -> Result<FootprintReport> {
        debug!(extractor = extractor.name(), "Extracting activities");
        let records = extractor.extract(text, context_files).await?;
        Ok(self.process(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::error::Error;
    use crate::extraction::MockExtractor;
    use crate::factors::EmissionFactorTable;
    use crate::models::ImpactLevel;

    const FACTORS: &str = "category,activity,unit,co2e_per_unit\nFood,beef steak,kg,27.0\n";

    fn engine(limits: Limits) -> FootprintEngine {
        let table = EmissionFactorTable::from_reader(FACTORS.as_bytes()).unwrap();
        FootprintEngine::with_parts(
            FootprintCalculator::new(table),
            ResultSanitizer::new(limits),
        )
    }

    #[test]
    fn test_process_counts_dropped() {
        let report = engine(Limits::default()).process(&[
            ActivityRecord::new("Transport", "Uber ride")
                .with_quantity(10.0)
                .with_unit("km")
                .with_factor(0.2),
            ActivityRecord::new("Food", "steak").with_quantity(1.0),
        ]);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.skipped, 1);
        assert!((report.total_co2e - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_process_applies_caps() {
        let report = engine(Limits::new(50.0, 60.0).unwrap()).process(&[
            ActivityRecord::new("Energy", "heating")
                .with_quantity(1000.0)
                .with_factor(1.0),
            ActivityRecord::new("Transport", "flight")
                .with_quantity(100.0)
                .with_factor(0.25),
        ]);
        assert!(report.results.iter().all(|r| r.co2e <= 50.0));
        assert!(report.total_co2e <= 60.0);
        assert!(report.scale_factor.is_some());
    }

    #[test]
    fn test_new_fails_on_missing_factor_table() {
        let config = EngineConfig {
            factors_path: PathBuf::from("/nonexistent/factors.csv"),
            ..EngineConfig::default()
        };
        assert!(matches!(
            FootprintEngine::new(&config),
            Err(Error::FactorTable(_))
        ));
    }

    #[test]
    fn test_new_fails_on_invalid_limits() {
        let config = EngineConfig {
            limits: Limits {
                max_co2e_per_item: -1.0,
                max_total_co2e: 10.0,
            },
            ..EngineConfig::default()
        };
        assert!(matches!(FootprintEngine::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_analyze_text() {
        let extractor = MockExtractor::new(vec![ActivityRecord::new("Food", "beef steak")
            .with_quantity(0.2)
            .with_factor(27.0)
            .with_impact("very_high")]);
        let report = engine(Limits::default())
            .analyze_text(&extractor, "Had a steak", &[])
            .await
            .unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].co2e_impact_level, ImpactLevel::VeryHigh);
        assert_eq!(report.suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_text_extraction_failure_is_error() {
        let extractor = MockExtractor::failing("model unavailable");
        let result = engine(Limits::default())
            .analyze_text(&extractor, "Had a steak", &[])
            .await;
        assert!(matches!(result, Err(Error::Extraction(_))));
    }

    #[tokio::test]
    async fn test_analyze_text_nothing_found_is_empty_report() {
        let extractor = MockExtractor::new(Vec::new());
        let report = engine(Limits::default())
            .analyze_text(&extractor, "Stayed home", &[])
            .await
            .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FootprintEngine>();
    }
}
