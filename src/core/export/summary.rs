//! Export outcome and reporting

use crate::core::estimate::{ExportProfile, SizeEstimate, TimeEstimate};
use crate::core::render::RenderedOutput;
use crate::domain::EntityKind;
use serde::Serialize;
use std::time::Duration;

/// Size and time forecast for a request, computed before any row is fetched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    pub entity: EntityKind,

    /// Registry name of the renderer
    pub format: String,
    pub profile: ExportProfile,

    /// Rows the store reports for the request, after its row window
    pub record_count: u64,

    pub estimate: SizeEstimate,
    pub time_estimate: TimeEstimate,
}

impl ExportPlan {
    /// Whether the estimate carries a warning
    pub fn has_warning(&self) -> bool {
        self.estimate.warning.is_some()
    }

    pub fn log_plan(&self) {
        tracing::info!(
            entity = %self.entity,
            format = %self.format,
            profile = %self.profile,
            record_count = self.record_count,
            estimated_size = %self.estimate.formatted,
            estimated_time = %self.time_estimate.formatted,
            tier = ?self.estimate.tier,
            "Export estimate"
        );
        if let Some(warning) = &self.estimate.warning {
            tracing::warn!(warning = %warning, "Export size warning");
        }
    }
}

/// Result of a completed export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub output: RenderedOutput,
    pub plan: ExportPlan,

    /// Rows actually rendered
    pub record_count: usize,

    pub duration: Duration,
}

impl ExportOutcome {
    pub fn estimate(&self) -> &SizeEstimate {
        &self.plan.estimate
    }

    pub fn time_estimate(&self) -> &TimeEstimate {
        &self.plan.time_estimate
    }

    /// `<entity>_<YYYYMMDD_HHMMSS>.<ext>`
    pub fn suggested_filename(&self) -> String {
        self.output.suggested_filename(self.plan.entity)
    }

    /// Actual size relative to the estimate, in percent
    pub fn estimate_accuracy(&self) -> f64 {
        if self.plan.estimate.bytes == 0 {
            return 100.0;
        }
        (self.output.len() as f64 / self.plan.estimate.bytes as f64) * 100.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            entity = %self.plan.entity,
            format = %self.plan.format,
            records = self.record_count,
            bytes = self.output.len(),
            estimated_bytes = self.plan.estimate.bytes,
            estimate_accuracy = format!("{:.1}%", self.estimate_accuracy()),
            duration_ms = self.duration.as_millis() as u64,
            "Export summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimate::{ExportFormat, SizeEstimator};

    fn plan() -> ExportPlan {
        let estimator = SizeEstimator::new();
        let estimate = estimator.estimate(10, ExportFormat::Csv, ExportProfile::Simple);
        let time_estimate = estimator.estimate_time(estimate.bytes);
        ExportPlan {
            entity: EntityKind::Client,
            format: "csv".to_string(),
            profile: ExportProfile::Simple,
            record_count: 10,
            estimate,
            time_estimate,
        }
    }

    #[test]
    fn test_plan_without_warning() {
        let plan = plan();
        assert!(!plan.has_warning());
        assert_eq!(plan.estimate.bytes, 1_600);
        assert_eq!(plan.time_estimate.seconds, 5);
    }

    #[test]
    fn test_outcome_accuracy_and_filename() {
        let outcome = ExportOutcome {
            output: RenderedOutput {
                bytes: vec![b'x'; 800],
                mime_type: "text/csv".to_string(),
                file_extension: "csv".to_string(),
            },
            plan: plan(),
            record_count: 10,
            duration: Duration::from_millis(12),
        };

        assert_eq!(outcome.estimate_accuracy(), 50.0);
        assert!(outcome.suggested_filename().starts_with("client_"));
        assert!(outcome.suggested_filename().ends_with(".csv"));
        assert_eq!(outcome.time_estimate().formatted, "~5 seconds");
    }
}
