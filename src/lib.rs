// Mercator - Market research export pipeline
// Copyright (c) 2025 Mercator Contributors
// Licensed under the MIT License

//! # Mercator - Market research export pipeline
//!
//! Mercator turns declarative export requests ("all leads of project 7,
//! ordered by name") into CSV, Excel or PDF files drawn from a PostgreSQL
//! market research database.
//!
//! ## Overview
//!
//! An export runs through five stages:
//! - **Interpreting** the request into parameterized query text plus bind values
//! - **Counting** matching rows
//! - **Estimating** output size and generation time, warning or refusing early
//! - **Executing** the query into typed rows, one record shape per entity
//! - **Rendering** the rows with the requested format
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Interpreter, executor, renderers, estimator and pipeline
//! - [`adapters`] - Data access trait and the PostgreSQL implementation
//! - [`domain`] - Entity kinds, requests, queries, typed rows and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mercator::adapters::database::create_data_access;
//! use mercator::config::load_config;
//! use mercator::core::estimate::{ExportFormat, ExportProfile};
//! use mercator::core::export::ExportPipeline;
//! use mercator::domain::ExportRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("mercator.toml")?;
//!     let pipeline = ExportPipeline::new(&config, create_data_access(&config.database)?)?;
//!
//!     let request = ExportRequest::new("lead")
//!         .with_project(7)
//!         .with_order_by("nome ASC");
//!     let outcome = pipeline
//!         .run(&request, ExportFormat::Excel, ExportProfile::Simple, CancellationToken::new())
//!         .await?;
//!
//!     std::fs::write(outcome.suggested_filename(), &outcome.output.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Query Safety
//!
//! Request values never reach query text. Filters become `"column" = $N`
//! predicates on known columns, and values are bound through the driver's
//! prepared statements.
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]; an export either yields
//! a complete [`core::export::ExportOutcome`] or exactly one
//! [`domain::MercatorError`].
//!
//! ```rust
//! use mercator::core::interpreter::QueryInterpreter;
//! use mercator::domain::{ExportRequest, MercatorError};
//!
//! let err = QueryInterpreter::default()
//!     .interpret(&ExportRequest::new("invoice"))
//!     .unwrap_err();
//! assert!(matches!(err, MercatorError::Validation(_)));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
