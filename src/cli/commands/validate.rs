//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Mercator configuration file.

use crate::adapters::postgresql::redact_connection_string;
use crate::config::load_config;
use crate::core::render::RendererRegistry;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let registry = match RendererRegistry::with_defaults(&config.render) {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Renderer configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.application.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Database: {}",
            redact_connection_string(config.database.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.database.max_connections);
        println!("  SSL Mode: {}", config.database.ssl_mode);
        println!("  Placeholder Style: {:?}", config.query.placeholder_style);
        println!("  Formats: {}", registry.names().join(", "));
        println!(
            "  Size Warnings (MB): {} / {} / {}",
            config.estimate.warn_medium_mb,
            config.estimate.warn_large_mb,
            config.estimate.warn_too_large_mb
        );
        println!("  Refuse Too Large: {}", config.estimate.refuse_too_large);
        println!("  Output Directory: {}", config.export.output_dir);
        if config.executor.sandbox {
            println!("  ⚠️  Sandbox mode: database failures produce empty exports");
        }
        println!();
        Ok(0)
    }
}
