//! Export orchestration
//!
//! - [`pipeline`] - interpret → count → estimate → execute → render
//! - [`summary`] - estimate plan and outcome reporting

pub mod pipeline;
pub mod summary;

pub use pipeline::{ExportPipeline, PageRequest};
pub use summary::{ExportOutcome, ExportPlan};
