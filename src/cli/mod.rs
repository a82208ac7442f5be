//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Mercator using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Mercator - market research export pipeline
#[derive(Parser, Debug)]
#[command(name = "mercator")]
#[command(version, about, long_about = None)]
#[command(author = "Mercator Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mercator.toml", env = "MERCATOR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MERCATOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export records to CSV, Excel or PDF
    Export(commands::export::ExportArgs),

    /// Estimate export size and duration without fetching rows
    Estimate(commands::estimate::EstimateArgs),

    /// Check an export request without touching the database
    ValidateRequest(commands::validate_request::ValidateRequestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
