//! PostgreSQL adapter implementing the data access trait

use crate::adapters::database::traits::{DataAccess, StoreRow};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::decode_row;
use crate::domain::{SqlValue, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL implementation of [`DataAccess`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl DataAccess for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<(), StoreError> {
        self.client.test_connection().await
    }

    async fn fetch_rows(
        &self,
        query_text: &str,
        parameters: &[SqlValue],
    ) -> Result<Vec<StoreRow>, StoreError> {
        let rows = self.client.query(query_text, parameters).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn fetch_scalar(
        &self,
        query_text: &str,
        parameters: &[SqlValue],
    ) -> Result<i64, StoreError> {
        let rows = self.client.query(query_text, parameters).await?;
        let row = rows
            .first()
            .ok_or_else(|| StoreError::MalformedRow("scalar query returned no rows".to_string()))?;

        row.try_get::<_, i64>(0)
            .map_err(|e| StoreError::MalformedRow(format!("scalar query: {e}")))
    }
}
