//! Export command implementation
//!
//! Runs one export request through the pipeline and writes the rendered file.

use super::{load_request, report_error};
use crate::adapters::database::create_data_access;
use crate::config::load_config;
use crate::core::estimate::{ExportFormat, ExportProfile};
use crate::core::export::{ExportPipeline, ExportPlan, PageRequest};
use crate::domain::MercatorError;
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the export request JSON file
    #[arg(short, long)]
    pub request: PathBuf,

    /// Output format (csv, excel, pdf)
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Estimation profile (simple, complete, report)
    #[arg(short, long, default_value = "simple")]
    pub profile: String,

    /// Output file; defaults to a generated name in export.output_dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export only this page (1-based)
    #[arg(long)]
    pub page: Option<u64>,

    /// Rows per page
    #[arg(long, default_value_t = 1000, requires = "page")]
    pub page_size: u64,

    /// Skip confirmation prompt on size warnings
    #[arg(short, long)]
    pub yes: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str, cancel: CancellationToken) -> anyhow::Result<i32> {
        tracing::info!(request = %self.request.display(), format = %self.format, "Starting export command");

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
                tracing::error!(error = %e, "Failed to create database client");
                eprintln!("❌ Failed to initialize database access: {e}");
                return Ok(4);
            }
        };

        let pipeline = match ExportPipeline::new(&config, store) {
            Ok(p) => p,
            Err(e) => return Ok(report_error("Failed to initialize export", &e)),
        };

        let page = self.page.map(|page| PageRequest::new(page, self.page_size));

        if !self.yes {
            let plan = match pipeline.estimate_page(&request, format, profile, page).await {
                Ok(plan) => plan,
                Err(e) => return Ok(report_error("Estimate failed", &e)),
            };
            print_plan(&plan);
            if plan.has_warning() && !confirm("Proceed with export? [y/N]: ")? {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        println!("🚀 Starting export...");
        let outcome = match pipeline.run_page(&request, format, profile, page, cancel).await {
            Ok(o) => o,
            Err(e) => return Ok(report_error("Export failed", &e)),
        };

        let path = match &self.output {
            Some(path) => path.clone(),
            None => Path::new(&config.export.output_dir).join(outcome.suggested_filename()),
        };
        if let Err(e) = write_output(&path, &outcome.output.bytes) {
            return Ok(report_error("Failed to write output", &e));
        }

        println!();
        println!("📊 Export Summary:");
        println!("  Entity: {}", outcome.plan.entity);
        println!("  Format: {} ({})", format, outcome.output.mime_type);
        println!("  Records: {}", outcome.record_count);
        println!("  Size: {}", crate::core::estimate::format_bytes(outcome.output.len() as u64));
        println!("  Estimated: {}", outcome.estimate().formatted);
        println!("  Duration: {:.2}s", outcome.duration.as_secs_f64());
        println!("  Output: {}", path.display());
        println!();
        println!("✅ Export completed successfully");

        Ok(0)
    }
}

pub(crate) fn parse_format_profile(
    format: &str,
    profile: &str,
) -> Result<(ExportFormat, ExportProfile), MercatorError> {
    Ok((format.parse()?, profile.parse()?))
}

pub(crate) fn print_plan(plan: &ExportPlan) {
    println!("Export Estimate:");
    println!("  Entity: {}", plan.entity);
    println!("  Format: {}", plan.format);
    println!("  Profile: {}", plan.profile);
    println!("  Records: {}", plan.record_count);
    println!("  Estimated size: {}", plan.estimate.formatted);
    println!("  Estimated time: {}", plan.time_estimate.formatted);
    if let Some(warning) = &plan.estimate.warning {
        println!("  ⚠️  {warning}");
    }
    println!();
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), MercatorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote export file");
    Ok(())
}
