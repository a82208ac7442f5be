//! Data access abstraction
//!
//! This module defines the trait the export pipeline uses to reach the
//! relational store. The pipeline never builds SQL with values in it; it hands
//! placeholder-only text plus bind values to an implementation of
//! [`DataAccess`], which must bind them with the store's native mechanism.

use crate::domain::{SqlValue, StoreError};
use async_trait::async_trait;

/// A result row as column name → JSON value, in select-list order
pub type StoreRow = serde_json::Map<String, serde_json::Value>;

/// Relational store used by the query executor
///
/// Implementations must be safe to share across concurrent exports.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Test that the store is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be established.
    async fn test_connection(&self) -> Result<(), StoreError>;

    /// Run a query and return all rows
    ///
    /// # Arguments
    ///
    /// * `query_text` - Query containing only placeholders for values
    /// * `parameters` - Bind values, one per placeholder, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable, the relation is missing,
    /// or the query fails.
    async fn fetch_rows(
        &self,
        query_text: &str,
        parameters: &[SqlValue],
    ) -> Result<Vec<StoreRow>, StoreError>;

    /// Run a query returning a single integer (e.g. `COUNT(*)`)
    ///
    /// # Errors
    ///
    /// Same as [`fetch_rows`](Self::fetch_rows), plus an error if the query
    /// yields no row or a non-integer first column.
    async fn fetch_scalar(&self, query_text: &str, parameters: &[SqlValue])
        -> Result<i64, StoreError>;
}
