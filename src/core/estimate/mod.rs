//! Export size and duration estimation
//!
//! Estimates are computed from the record count returned by
//! [`QueryExecutor::count`](crate::core::executor::QueryExecutor::count), so a
//! caller can warn or refuse before rows are fetched and rendered.

pub mod size;
pub mod time;

pub use size::{format_bytes, SizeEstimate, SizeEstimator, SizeTier};
pub use time::TimeEstimate;

use crate::domain::MercatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in output formats, and the estimator rows they select
///
/// Renderers registered later pick one of these rows through
/// [`Renderer::size_class`](crate::core::render::Renderer::size_class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

    /// Name under which the format's renderer is registered
    pub fn renderer_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.renderer_name())
    }
}

impl AsRef<str> for ExportFormat {
    fn as_ref(&self) -> &str {
        self.renderer_name()
    }
}

impl FromStr for ExportFormat {
    type Err = MercatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(MercatorError::validation(format!(
                "unsupported format '{other}', expected csv, excel or pdf"
            ))),
        }
    }
}

/// How much detail an export carries per record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportProfile {
    #[default]
    Simple,
    Complete,
    Report,
}

impl ExportProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportProfile::Simple => "simple",
            ExportProfile::Complete => "complete",
            ExportProfile::Report => "report",
        }
    }
}

impl fmt::Display for ExportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportProfile {
    type Err = MercatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ExportProfile::Simple),
            "complete" => Ok(ExportProfile::Complete),
            "report" => Ok(ExportProfile::Report),
            other => Err(MercatorError::validation(format!(
                "unsupported profile '{other}', expected simple, complete or report"
            ))),
        }
    }
}
