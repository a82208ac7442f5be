//! Validate-request command implementation
//!
//! Checks a request file and shows the query it would run. Never connects
//! to the database.

use super::{load_request, report_error};
use crate::core::interpreter::QueryInterpreter;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate-request command
#[derive(Args, Debug)]
pub struct ValidateRequestArgs {
    /// Path to the export request JSON file
    #[arg(short, long)]
    pub request: PathBuf,
}

impl ValidateRequestArgs {
    /// Execute the validate-request command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        println!("🔍 Validating export request: {}", self.request.display());
        println!();

        let request = match load_request(&self.request) {
            Ok(r) => r,
            Err(e) => return Ok(report_error("Failed to read request", &e)),
        };

        let interpreter = QueryInterpreter::default();
        let report = interpreter.validate(&request);
        if !report.valid {
            println!("❌ Request is invalid");
            for error in &report.errors {
                println!("   - {error}");
            }
            return Ok(2);
        }

        let query = match interpreter.interpret(&request) {
            Ok(q) => q,
            Err(e) => return Ok(report_error("Request could not be interpreted", &e)),
        };

        println!("✅ Request is valid");
        println!();
        println!("  Entity: {}", query.entity);
        println!("  Fields: {}", query.fields.join(", "));
        println!("  Query: {}", query.query_text);
        println!("  Parameters: {}", query.parameters.len());
        Ok(0)
    }
}
