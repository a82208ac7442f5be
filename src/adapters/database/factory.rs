//! Data access factory

use crate::adapters::database::traits::DataAccess;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::DatabaseConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the data access implementation for `config`
///
/// The pool is created lazily; call
/// [`DataAccess::test_connection`] to fail fast on an unreachable store.
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub fn create_data_access(config: &DatabaseConfig) -> Result<Arc<dyn DataAccess>> {
    tracing::info!(
        max_connections = config.max_connections,
        tls = config.tls_enabled(),
        "Creating PostgreSQL data access"
    );
    let client = PostgreSQLClient::new(config.clone())?;
    Ok(Arc::new(PostgreSQLAdapter::new(client)))
}
