//! Configuration management for Mercator.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Mercator uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MERCATOR_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mercator::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("mercator.toml")?;
//! println!("Pool size: {}", config.database.max_connections);
//! println!("CSV delimiter: {}", config.render.csv.delimiter);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and runtime environment
//! - [`DatabaseConfig`] - PostgreSQL connection and pool settings
//! - [`QueryConfig`] - Placeholder syntax and default field overrides
//! - [`ExecutorConfig`] - Date normalization and sandbox mode
//! - [`RenderConfig`] - CSV, spreadsheet and PDF renderer settings
//! - [`EstimateConfig`] - Size tiers and time estimation
//! - [`ExportConfig`] - Deadlines and output directory
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! environment = "production"
//!
//! [database]
//! connection_string = "${MERCATOR_DATABASE_URL}"
//! max_connections = 10
//!
//! [query.default_fields]
//! lead = ["id", "nome", "email", "status"]
//!
//! [render.csv]
//! delimiter = ";"
//! utf8_bom = true
//!
//! [estimate]
//! refuse_too_large = true
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, CsvConfig, DatabaseConfig, EstimateConfig, ExcelConfig, ExecutorConfig,
    ExportConfig, LoggingConfig, MercatorConfig, PdfConfig, QueryConfig, RenderConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
