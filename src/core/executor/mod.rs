//! Query executor
//!
//! Runs interpreted queries against a [`DataAccess`] store, maps rows into
//! typed [`EntityRow`]s and offers the companion count and pagination
//! operations. These are the only pipeline operations that cross a process
//! boundary.

pub mod pagination;

pub use pagination::paginate;

use crate::adapters::database::DataAccess;
use crate::config::schema::ExecutorConfig;
use crate::domain::{EntityRow, InterpretedQuery, MercatorError, Result, StoreError};
use std::sync::Arc;

/// Executor behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Collapse timestamps to `YYYY-MM-DD` dates before returning rows
    pub format_dates: bool,

    /// Treat an unavailable store as an empty result (tests and sandboxes only)
    pub sandbox: bool,
}

impl From<&ExecutorConfig> for ExecutorOptions {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            format_dates: config.format_dates,
            sandbox: config.sandbox,
        }
    }
}

/// Executes interpreted queries
pub struct QueryExecutor {
    store: Arc<dyn DataAccess>,
    options: ExecutorOptions,
}

impl QueryExecutor {
    /// Create an executor over `store`
    pub fn new(store: Arc<dyn DataAccess>, options: ExecutorOptions) -> Self {
        Self { store, options }
    }

    /// Options in effect
    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Run `query` and return its rows
    ///
    /// # Errors
    ///
    /// Returns [`MercatorError::DataUnavailable`] on store failure (unless in
    /// sandbox mode) or when a row does not fit the entity's shape, and a
    /// validation error when a filter value cannot bind to its column.
    pub async fn execute(&self, query: &InterpretedQuery) -> Result<Vec<EntityRow>> {
        check_bindings(query)?;
        tracing::debug!(entity = %query.entity, query = %query.query_text, "Executing export query");

        let raw_rows = match self
            .store
            .fetch_rows(&query.query_text, &query.parameters)
            .await
        {
            Ok(rows) => rows,
            Err(e) => return self.unavailable(e).map(|_| Vec::new()),
        };

        let mut rows = raw_rows
            .into_iter()
            .map(|row| EntityRow::from_json(query.entity, row))
            .collect::<std::result::Result<Vec<_>, StoreError>>()?;

        if self.options.format_dates {
            rows.iter_mut().for_each(EntityRow::normalize_dates);
        }

        tracing::debug!(entity = %query.entity, rows = rows.len(), "Export query returned");
        Ok(rows)
    }

    /// Number of rows `query` matches, ignoring its ordering and row cap
    ///
    /// # Errors
    ///
    /// Returns [`MercatorError::DataUnavailable`] on store failure (unless in
    /// sandbox mode).
    pub async fn count(&self, query: &InterpretedQuery) -> Result<u64> {
        check_bindings(query)?;
        let count_text = query.count_text();
        tracing::debug!(entity = %query.entity, query = %count_text, "Counting export rows");

        match self.store.fetch_scalar(&count_text, &query.parameters).await {
            Ok(count) => Ok(count.max(0) as u64),
            Err(e) => self.unavailable(e).map(|_| 0),
        }
    }

    /// Page `page` (1-based) of `query`, `page_size` rows per page
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero page or page size.
    pub fn paginate(
        &self,
        query: &InterpretedQuery,
        page: u64,
        page_size: u64,
    ) -> Result<InterpretedQuery> {
        paginate(query, page, page_size)
    }

    /// Classify a store failure
    ///
    /// A value that cannot bind to its column is a request problem. Only an
    /// unreachable store or a missing relation is absorbed in sandbox mode.
    fn unavailable(&self, error: StoreError) -> Result<()> {
        match error {
            StoreError::BindFailed { index, message } => Err(MercatorError::validation(format!(
                "filter value {index} does not match its column: {message}"
            ))),
            StoreError::ConnectionFailed(_) | StoreError::RelationMissing(_)
                if self.options.sandbox =>
            {
                tracing::warn!(error = %error, "Data store unavailable, sandbox mode returns no rows");
                Ok(())
            }
            other => Err(MercatorError::DataUnavailable(other)),
        }
    }
}

fn check_bindings(query: &InterpretedQuery) -> Result<()> {
    let placeholders = query.placeholder_count();
    if placeholders != query.parameters.len() {
        return Err(MercatorError::validation(format!(
            "query has {} placeholders but {} parameters",
            placeholders,
            query.parameters.len()
        )));
    }
    Ok(())
}
