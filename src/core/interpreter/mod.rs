//! Query interpreter
//!
//! Turns a declarative [`ExportRequest`] into an [`InterpretedQuery`].
//! Predicates are emitted in a fixed order (project scope, research scope,
//! then filters in the order supplied) so the same request always produces
//! the same query text. Values only ever appear as bind parameters.
//!
//! # Example
//!
//! ```
//! use mercator::core::interpreter::QueryInterpreter;
//! use mercator::domain::ExportRequest;
//!
//! let interpreter = QueryInterpreter::default();
//! let request = ExportRequest::new("market")
//!     .with_project(4)
//!     .with_filter("segmento", "Tech")
//!     .with_fields(["id", "nome"]);
//!
//! let query = interpreter.interpret(&request).unwrap();
//! assert_eq!(
//!     query.query_text,
//!     r#"SELECT "id", "nome" FROM "mercados" WHERE "projeto_id" = $1 AND "segmento" = $2"#
//! );
//! assert_eq!(query.parameters.len(), query.placeholder_count());
//! ```

pub mod fields;
pub mod validate;

pub use fields::DefaultFieldSets;
pub use validate::{validate_request, ValidationReport};

use crate::config::schema::QueryConfig;
use crate::domain::query::quote_identifier;
use crate::domain::{
    EntityKind, ExportRequest, InterpretedQuery, MercatorError, PlaceholderStyle, QueryParts,
    Result, SqlValue, PROJECT_SCOPE_COLUMN, RESEARCH_SCOPE_COLUMN,
};
use std::str::FromStr;

/// Converts export requests into interpreted queries
#[derive(Debug, Clone, Default)]
pub struct QueryInterpreter {
    field_sets: DefaultFieldSets,
    placeholder_style: PlaceholderStyle,
}

impl QueryInterpreter {
    /// Create an interpreter with explicit default field sets and placeholder syntax
    pub fn new(field_sets: DefaultFieldSets, placeholder_style: PlaceholderStyle) -> Self {
        Self {
            field_sets,
            placeholder_style,
        }
    }

    /// Create an interpreter from the `[query]` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if a default field override is invalid.
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        let field_sets = DefaultFieldSets::from_overrides(&config.default_fields)?;
        Ok(Self::new(field_sets, config.placeholder_style))
    }

    /// Default field sets in use
    pub fn field_sets(&self) -> &DefaultFieldSets {
        &self.field_sets
    }

    /// Validate a request without interpreting it
    pub fn validate(&self, request: &ExportRequest) -> ValidationReport {
        validate_request(request)
    }

    /// Interpret a request
    ///
    /// # Errors
    ///
    /// Returns [`MercatorError::Validation`] for any request that does not
    /// pass [`validate`](Self::validate); interpretation never guesses.
    pub fn interpret(&self, request: &ExportRequest) -> Result<InterpretedQuery> {
        let report = self.validate(request);
        if !report.valid {
            tracing::debug!(errors = ?report.errors, "Rejected export request");
            return Err(MercatorError::Validation(report.errors));
        }

        let entity = request
            .entity
            .as_deref()
            .map(EntityKind::from_str)
            .transpose()
            .map_err(MercatorError::validation)?
            .ok_or_else(|| MercatorError::validation("entity is required"))?;

        let fields = match &request.fields {
            Some(fields) if !fields.is_empty() => fields.clone(),
            _ => self.field_sets.for_entity(entity).to_vec(),
        };

        let mut predicates = Vec::new();
        let mut parameters = Vec::new();
        let style = self.placeholder_style;
        let mut bind = |column: &str, value: SqlValue| {
            parameters.push(value);
            predicates.push(format!(
                "{} = {}",
                quote_identifier(column),
                style.placeholder(parameters.len())
            ));
        };

        if let Some(project_id) = request.project_id {
            bind(PROJECT_SCOPE_COLUMN, SqlValue::Integer(project_id));
        }
        if let Some(research_id) = request.research_id {
            bind(RESEARCH_SCOPE_COLUMN, SqlValue::Integer(research_id));
        }
        for (column, value) in &request.filters {
            if value.is_null() {
                continue;
            }
            let value = SqlValue::from_json(value).ok_or_else(|| {
                MercatorError::validation(format!("filter '{column}' must be a scalar value"))
            })?;
            bind(column, value);
        }

        let parts = QueryParts {
            table: entity.table().to_string(),
            predicates,
            order_by: request
                .order_by
                .as_deref()
                .map(str::trim)
                .map(str::to_string),
            limit: request.limit.filter(|l| *l > 0).map(|l| l as u64),
            offset: None,
            placeholder_style: style,
        };

        let query = InterpretedQuery::new(entity, fields, parts, parameters);
        tracing::debug!(
            entity = %entity,
            fields = query.fields.len(),
            parameters = query.parameters.len(),
            query = %query.query_text,
            "Interpreted export request"
        );
        Ok(query)
    }
}
