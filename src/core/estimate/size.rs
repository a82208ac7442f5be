//! Size estimation and warning tiers

use super::time::{estimate_time, TimeEstimate};
use super::{ExportFormat, ExportProfile};
use crate::config::EstimateConfig;
use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Average bytes per record for a format and profile
fn average_record_bytes(format: ExportFormat, profile: ExportProfile) -> u64 {
    match (format, profile) {
        (ExportFormat::Csv, ExportProfile::Simple) => 150,
        (ExportFormat::Csv, ExportProfile::Complete) => 400,
        (ExportFormat::Csv, ExportProfile::Report) => 600,
        (ExportFormat::Excel, ExportProfile::Simple) => 200,
        (ExportFormat::Excel, ExportProfile::Complete) => 500,
        (ExportFormat::Excel, ExportProfile::Report) => 800,
        (ExportFormat::Pdf, ExportProfile::Simple) => 300,
        (ExportFormat::Pdf, ExportProfile::Complete) => 800,
        (ExportFormat::Pdf, ExportProfile::Report) => 1500,
    }
}

/// Fixed header and metadata cost of a format
fn format_overhead(format: ExportFormat) -> u64 {
    match format {
        ExportFormat::Csv => 100,
        ExportFormat::Excel => 5_000,
        ExportFormat::Pdf => 10_000,
    }
}

/// Warning tier of an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Normal,
    Medium,
    Large,
    TooLarge,
}

impl SizeTier {
    /// Warning shown to the user, if any
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            SizeTier::Normal => None,
            SizeTier::Medium => Some("Medium export, may take up to ~1 minute"),
            SizeTier::Large => Some("Large export, may take several minutes"),
            SizeTier::TooLarge => {
                Some("Export too large, add filters or export in batches")
            }
        }
    }
}

/// Result of [`SizeEstimator::estimate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeEstimate {
    pub bytes: u64,
    pub megabytes: f64,
    pub tier: SizeTier,
    pub warning: Option<String>,
    /// Human-readable size, see [`format_bytes`]
    pub formatted: String,
}

/// Estimates output size from a record count
///
/// `bytes = record_count * average(format, profile) + overhead(format)`.
/// Pure and deterministic.
#[derive(Debug, Clone)]
pub struct SizeEstimator {
    config: EstimateConfig,
}

impl SizeEstimator {
    pub fn new() -> Self {
        Self::from_config(&EstimateConfig::default())
    }

    pub fn from_config(config: &EstimateConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &EstimateConfig {
        &self.config
    }

    pub fn estimate(
        &self,
        record_count: u64,
        format: ExportFormat,
        profile: ExportProfile,
    ) -> SizeEstimate {
        let bytes = record_count
            .saturating_mul(average_record_bytes(format, profile))
            .saturating_add(format_overhead(format));
        let megabytes = bytes as f64 / BYTES_PER_MB;
        let tier = self.tier(megabytes);

        SizeEstimate {
            bytes,
            megabytes,
            tier,
            warning: tier.warning().map(str::to_string),
            formatted: format_bytes(bytes),
        }
    }

    /// Time estimate for an already computed size
    pub fn estimate_time(&self, bytes: u64) -> TimeEstimate {
        estimate_time(bytes, self.config.seconds_per_mb, self.config.min_seconds)
    }

    fn tier(&self, megabytes: f64) -> SizeTier {
        if megabytes > self.config.warn_too_large_mb {
            SizeTier::TooLarge
        } else if megabytes > self.config.warn_large_mb {
            SizeTier::Large
        } else if megabytes > self.config.warn_medium_mb {
            SizeTier::Medium
        } else {
            SizeTier::Normal
        }
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable byte count with base-1024 units
///
/// ```
/// use mercator::core::estimate::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
