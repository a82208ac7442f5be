//! Core export logic for Mercator.
//!
//! # Modules
//!
//! - [`interpreter`] - Request validation and parameterized query building
//! - [`executor`] - Query execution, counting and pagination against a [`DataAccess`](crate::adapters::database::DataAccess)
//! - [`render`] - CSV, spreadsheet and PDF renderers behind one trait
//! - [`estimate`] - Output size and generation time forecasts
//! - [`export`] - Orchestration of one export from request to bytes
//!
//! # Export Workflow
//!
//! 1. **Interpret**: validate the request and build query text plus bind values
//! 2. **Count**: ask the store how many rows match
//! 3. **Estimate**: forecast size and time, warn or refuse
//! 4. **Execute**: fetch typed rows under a deadline and cancellation token
//! 5. **Render**: produce bytes on a blocking worker
//!
//! # Example
//!
//! ```rust,no_run
//! use mercator::adapters::database::create_data_access;
//! use mercator::config::load_config;
//! use mercator::core::estimate::{ExportFormat, ExportProfile};
//! use mercator::core::export::ExportPipeline;
//! use mercator::domain::ExportRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("mercator.toml")?;
//! let store = create_data_access(&config.database)?;
//! let pipeline = ExportPipeline::new(&config, store)?;
//!
//! let request = ExportRequest::new("market").with_project(7);
//! let outcome = pipeline
//!     .run(&request, ExportFormat::Csv, ExportProfile::Simple, CancellationToken::new())
//!     .await?;
//!
//! println!("{} records, {} bytes", outcome.record_count, outcome.output.len());
//! # Ok(())
//! # }
//! ```

pub mod estimate;
pub mod executor;
pub mod export;
pub mod interpreter;
pub mod render;
