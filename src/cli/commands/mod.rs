//! CLI command implementations
//!
//! Commands return a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Invalid request or configuration |
//! | 3 | Export refused as too large |
//! | 4 | Database unavailable |
//! | 5 | Render or other fatal error |
//! | 124 | Export timed out |
//! | 130 | Export cancelled |

pub mod estimate;
pub mod export;
pub mod validate;
pub mod validate_request;

use crate::domain::{ExportRequest, MercatorError};
use std::path::Path;

/// Exit code for a failed export
pub fn exit_code(error: &MercatorError) -> i32 {
    match error {
        MercatorError::Validation(_)
        | MercatorError::Configuration(_)
        | MercatorError::Serialization(_) => 2,
        MercatorError::TooLarge(_) => 3,
        MercatorError::DataUnavailable(_) => 4,
        MercatorError::Render(_) | MercatorError::Io(_) => 5,
        MercatorError::Timeout(_) => 124,
        MercatorError::Cancelled => 130,
    }
}

/// Read an export request from a JSON file
pub fn load_request(path: &Path) -> Result<ExportRequest, MercatorError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        MercatorError::Io(format!("Failed to read request file {}: {e}", path.display()))
    })?;
    ExportRequest::from_json_str(&json)
}

/// Print an error and return its exit code
pub(crate) fn report_error(context: &str, error: &MercatorError) -> i32 {
    tracing::error!(error = %error, context = context, "Command failed");
    eprintln!("❌ {context}: {error}");
    if let Some(messages) = error.validation_errors() {
        for message in messages {
            eprintln!("   - {message}");
        }
    }
    exit_code(error)
}
