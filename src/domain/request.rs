//! Declarative export request
//!
//! The request is what the UI or CLI layer sends: which entity, which scope,
//! which equality filters, which fields and in what order. It is a plain value
//! object; nothing here checks it. See
//! [`QueryInterpreter::validate`](crate::core::interpreter::QueryInterpreter::validate).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An export request as received from the caller
///
/// The JSON shape uses camelCase keys and the research scope is carried as
/// `pesquisaId`:
///
/// ```
/// use mercator::domain::ExportRequest;
///
/// let request = ExportRequest::from_json_str(r#"{
///     "entity": "lead",
///     "projectId": 3,
///     "pesquisaId": 12,
///     "filters": {"status": "qualificado"},
///     "fields": ["id", "nome", "email"],
///     "orderBy": "nome ASC",
///     "limit": 500
/// }"#).unwrap();
///
/// assert_eq!(request.entity.as_deref(), Some("lead"));
/// assert_eq!(request.research_id, Some(12));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Entity name; must be one of the supported entity kinds
    #[serde(default)]
    pub entity: Option<String>,

    /// Project scope
    #[serde(default)]
    pub project_id: Option<i64>,

    /// Research scope within a project
    #[serde(default, rename = "pesquisaId")]
    pub research_id: Option<i64>,

    /// Column → equality value; iteration order is the order supplied
    #[serde(default)]
    pub filters: Map<String, Value>,

    /// Ordered field list; `None` or empty selects the entity's default fields
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// `"<column> [ASC|DESC]"`
    #[serde(default)]
    pub order_by: Option<String>,

    /// Row cap
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ExportRequest {
    /// Start a request for the named entity
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            ..Self::default()
        }
    }

    /// Parse a request from its JSON representation
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has the wrong shape.
    pub fn from_json_str(json: &str) -> crate::domain::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Restrict to a project
    pub fn with_project(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Restrict to a research within the project
    pub fn with_research(mut self, research_id: i64) -> Self {
        self.research_id = Some(research_id);
        self
    }

    /// Add an equality filter; later filters keep their insertion position
    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(column.into(), value.into());
        self
    }

    /// Set the ordered field list
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the ordering clause
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Set the row cap
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
