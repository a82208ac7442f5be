//! Estimate command implementation

use super::export::{parse_format_profile, print_plan};
use super::{load_request, report_error};
use crate::adapters::database::create_data_access;
use crate::config::load_config;
use crate::core::export::ExportPipeline;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the estimate command
#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Path to the export request JSON file
    #[arg(short, long)]
    pub request: PathBuf,

    /// Output format (csv, excel, pdf)
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Estimation profile (simple, complete, report)
    #[arg(short, long, default_value = "simple")]
    pub profile: String,

    /// Print the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

impl EstimateArgs {
    /// Execute the estimate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Failed to load configuration", &e)),
        };
        let (format, profile) = match parse_format_profile(&self.format, &self.profile) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(report_error("Invalid arguments", &e)),
        };
        let request = match load_request(&self.request) {
            Ok(r) => r,
            Err(e) => return Ok(report_error("Invalid export request", &e)),
        };

        let store = match create_data_access(&config.database) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to initialize database access: {e}");
                return Ok(4);
            }
        };
        let pipeline = match ExportPipeline::new(&config, store) {
            Ok(p) => p,
            Err(e) => return Ok(report_error("Failed to initialize export", &e)),
        };

        let plan = match pipeline.estimate(&request, format, profile).await {
            Ok(plan) => plan,
            Err(e) => return Ok(report_error("Estimate failed", &e)),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        Ok(0)
    }
}
