//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, MercatorConfig, PageOrientation};
use super::secret_string;
use crate::domain::{MercatorError, PlaceholderStyle, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MercatorConfig
/// 4. Applies environment variable overrides (MERCATOR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`MercatorError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use mercator::config::load_config;
///
/// let config = load_config("mercator.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MercatorConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MercatorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MercatorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same steps as [`load_config`] without the file access.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_str(contents: &str) -> Result<MercatorConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: MercatorConfig = toml::from_str(&contents)
        .map_err(|e| MercatorError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MercatorError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MercatorError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MercatorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            MercatorError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Applies environment variable overrides using the MERCATOR_* prefix
///
/// Environment variables follow the pattern `MERCATOR_<SECTION>_<KEY>`, for
/// example `MERCATOR_DATABASE_MAX_CONNECTIONS` or `MERCATOR_RENDER_CSV_DELIMITER`.
/// Unparseable values are reported rather than silently ignored.
fn apply_env_overrides(config: &mut MercatorConfig) -> Result<()> {
    // Application
    if let Some(val) = env_string("MERCATOR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_string("MERCATOR_APPLICATION_ENVIRONMENT") {
        config.application.environment = match val.to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => {
                return Err(MercatorError::Configuration(format!(
                    "Invalid value '{val}' for MERCATOR_APPLICATION_ENVIRONMENT"
                )))
            }
        };
    }

    // Database
    if let Some(val) = env_string("MERCATOR_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = secret_string(val);
    }
    if let Some(val) = env_parse("MERCATOR_DATABASE_MAX_CONNECTIONS")? {
        config.database.max_connections = val;
    }
    if let Some(val) = env_parse("MERCATOR_DATABASE_CONNECTION_TIMEOUT_SECONDS")? {
        config.database.connection_timeout_seconds = val;
    }
    if let Some(val) = env_parse("MERCATOR_DATABASE_STATEMENT_TIMEOUT_SECONDS")? {
        config.database.statement_timeout_seconds = val;
    }
    if let Some(val) = env_string("MERCATOR_DATABASE_SSL_MODE") {
        config.database.ssl_mode = val;
    }

    // Query
    if let Some(val) = env_string("MERCATOR_QUERY_PLACEHOLDER_STYLE") {
        config.query.placeholder_style = match val.to_ascii_lowercase().as_str() {
            "numbered" => PlaceholderStyle::Numbered,
            "question" => PlaceholderStyle::Question,
            _ => {
                return Err(MercatorError::Configuration(format!(
                    "Invalid value '{val}' for MERCATOR_QUERY_PLACEHOLDER_STYLE"
                )))
            }
        };
    }

    // Executor
    if let Some(val) = env_parse("MERCATOR_EXECUTOR_FORMAT_DATES")? {
        config.executor.format_dates = val;
    }
    if let Some(val) = env_parse("MERCATOR_EXECUTOR_SANDBOX")? {
        config.executor.sandbox = val;
    }

    // Renderers
    if let Some(val) = env_string("MERCATOR_RENDER_CSV_DELIMITER") {
        config.render.csv.delimiter = val;
    }
    if let Some(val) = env_parse("MERCATOR_RENDER_CSV_INCLUDE_HEADER")? {
        config.render.csv.include_header = val;
    }
    if let Some(val) = env_parse("MERCATOR_RENDER_CSV_UTF8_BOM")? {
        config.render.csv.utf8_bom = val;
    }
    if let Some(val) = env_string("MERCATOR_RENDER_EXCEL_SHEET_NAME") {
        config.render.excel.sheet_name = val;
    }
    if let Some(val) = env_parse("MERCATOR_RENDER_EXCEL_MAX_COLUMN_WIDTH")? {
        config.render.excel.max_column_width = val;
    }
    if let Some(val) = env_string("MERCATOR_RENDER_PDF_TITLE") {
        config.render.pdf.title = Some(val);
    }
    if let Some(val) = env_string("MERCATOR_RENDER_PDF_ORIENTATION") {
        config.render.pdf.orientation = match val.to_ascii_lowercase().as_str() {
            "portrait" => PageOrientation::Portrait,
            "landscape" => PageOrientation::Landscape,
            _ => {
                return Err(MercatorError::Configuration(format!(
                    "Invalid value '{val}' for MERCATOR_RENDER_PDF_ORIENTATION"
                )))
            }
        };
    }
    if let Some(val) = env_parse("MERCATOR_RENDER_PDF_FONT_SIZE")? {
        config.render.pdf.font_size = val;
    }

    // Estimation
    if let Some(val) = env_parse("MERCATOR_ESTIMATE_WARN_TOO_LARGE_MB")? {
        config.estimate.warn_too_large_mb = val;
    }
    if let Some(val) = env_parse("MERCATOR_ESTIMATE_REFUSE_TOO_LARGE")? {
        config.estimate.refuse_too_large = val;
    }

    // Export
    if let Some(val) = env_parse("MERCATOR_EXPORT_TIMEOUT_MULTIPLIER")? {
        config.export.timeout_multiplier = val;
    }
    if let Some(val) = env_parse("MERCATOR_EXPORT_MIN_TIMEOUT_SECS")? {
        config.export.min_timeout_secs = val;
    }
    if let Some(val) = env_string("MERCATOR_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }

    // Logging
    if let Some(val) = env_parse("MERCATOR_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_string("MERCATOR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_string("MERCATOR_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MERCATOR_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${MERCATOR_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("MERCATOR_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MERCATOR_LOADER_MISSING_VAR");
        let input = "password = \"${MERCATOR_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("MERCATOR_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("MERCATOR_LOADER_COMMENTED_VAR");
        let input = "# connection_string = \"${MERCATOR_LOADER_COMMENTED_VAR}\"\nx = 1";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${MERCATOR_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-mercator.toml");
        assert!(matches!(result, Err(MercatorError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[database]
connection_string = "postgresql://mercator:pw@localhost:5432/mercator"
ssl_mode = "disable"

[query.default_fields]
lead = ["id", "nome", "email"]

[render.csv]
delimiter = ";"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(
            config.database.connection_string.expose_secret(),
            "postgresql://mercator:pw@localhost:5432/mercator"
        );
        assert_eq!(config.query.default_fields["lead"].len(), 3);
        assert_eq!(config.render.csv.delimiter, ";");
        assert_eq!(config.estimate.warn_too_large_mb, 100.0);
    }

    #[test]
    fn test_load_config_requires_database() {
        let result = load_config_str("[application]\nlog_level = \"info\"\n");
        assert!(matches!(result, Err(MercatorError::Configuration(_))));
    }
}
