//! External system integrations for Mercator.
//!
//! - [`database`] - Data access trait and factory
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Adapters isolate the driver so the core pipeline can be tested against
//! in-memory implementations of [`database::DataAccess`].
//!
//! ```rust,no_run
//! use mercator::adapters::database::create_data_access;
//! use mercator::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("mercator.toml")?;
//! let store = create_data_access(&config.database)?;
//! store.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod postgresql;
