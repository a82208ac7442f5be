//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional
//! rolling JSON file layer. Query text may be logged at debug level; bind
//! values never are.
//!
//! # Example
//!
//! ```no_run
//! use mercator::logging::init_logging;
//! use mercator::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export
///
/// # Example
///
/// ```no_run
/// use mercator::log_export_start;
/// use mercator::domain::EntityKind;
///
/// log_export_start!(EntityKind::Market, "csv");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($entity:expr, $format:expr) => {
        tracing::info!(
            entity = %$entity,
            format = %$format,
            "Starting export"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use mercator::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, 10_240, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use mercator::log_error_with_context;
/// use mercator::domain::MercatorError;
///
/// let error = MercatorError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{EntityKind, MercatorError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_export_start!(EntityKind::Lead, "pdf");
        log_export_complete!(3usize, 512usize, Duration::from_millis(5));
        let error = MercatorError::Cancelled;
        log_error_with_context!(&error, "export");
    }
}
