//! Generation time estimation

use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEstimate {
    pub seconds: u64,
    /// "~N seconds" below a minute, "~N minute(s)" otherwise
    pub formatted: String,
}

/// Time to generate `bytes` at `seconds_per_mb`, never below `min_seconds`
pub fn estimate_time(bytes: u64, seconds_per_mb: f64, min_seconds: u64) -> TimeEstimate {
    let megabytes = bytes as f64 / BYTES_PER_MB;
    let seconds = ((megabytes * seconds_per_mb).round() as u64).max(min_seconds);

    let formatted = if seconds < 60 {
        format!("~{seconds} seconds")
    } else {
        let minutes = seconds.div_ceil(60);
        if minutes == 1 {
            "~1 minute".to_string()
        } else {
            format!("~{minutes} minutes")
        }
    };

    TimeEstimate { seconds, formatted }
}
