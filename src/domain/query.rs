//! Interpreted query
//!
//! An [`InterpretedQuery`] is the executable form of an export request: query
//! text containing only placeholders, plus the ordered bind values. The
//! structured parts it was assembled from are kept so the executor can derive
//! count and page queries without re-parsing SQL text.

use super::entity::EntityKind;
use serde::{Deserialize, Serialize};

/// A bind value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a scalar JSON value; arrays and objects have no bind form
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(SqlValue::Null),
            serde_json::Value::Bool(b) => Some(SqlValue::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(SqlValue::Integer)
                .or_else(|| n.as_f64().map(SqlValue::Float)),
            serde_json::Value::String(s) => Some(SqlValue::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

/// Placeholder syntax of the target store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... (PostgreSQL)
    #[default]
    Numbered,
    /// `?` (SQLite, MySQL)
    Question,
}

impl PlaceholderStyle {
    /// Placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            PlaceholderStyle::Numbered => format!("${index}"),
            PlaceholderStyle::Question => "?".to_string(),
        }
    }

    /// Number of placeholders in `text`
    pub fn count_in(&self, text: &str) -> usize {
        match self {
            PlaceholderStyle::Numbered => {
                let bytes = text.as_bytes();
                bytes
                    .windows(2)
                    .filter(|pair| pair[0] == b'$' && pair[1].is_ascii_digit())
                    .count()
            }
            PlaceholderStyle::Question => text.matches('?').count(),
        }
    }
}

/// Structured pieces an interpreted query is assembled from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParts {
    pub table: String,
    /// `"column" = <placeholder>` predicates, joined with AND
    pub predicates: Vec<String>,
    /// Ordering clause as supplied by the request
    pub order_by: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub placeholder_style: PlaceholderStyle,
}

impl QueryParts {
    fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    /// Full SELECT text for `fields`
    pub fn select_text(&self, fields: &[String]) -> String {
        let columns = fields
            .iter()
            .map(|f| quote_identifier(f))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = format!(
            "SELECT {} FROM {}{}",
            columns,
            quote_identifier(&self.table),
            self.where_clause()
        );
        if let Some(order_by) = &self.order_by {
            text.push_str(" ORDER BY ");
            text.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            text.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            text.push_str(&format!(" OFFSET {offset}"));
        }
        text
    }

    /// COUNT text over the same predicates, without ordering or row cap
    pub fn count_text(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_identifier(&self.table),
            self.where_clause()
        )
    }
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// The executable form of an export request
///
/// Invariant: the number of placeholders in `query_text` equals
/// `parameters.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretedQuery {
    pub query_text: String,
    pub parameters: Vec<SqlValue>,
    pub fields: Vec<String>,
    pub entity: EntityKind,
    parts: QueryParts,
}

impl InterpretedQuery {
    /// Assemble a query from its parts
    pub fn new(
        entity: EntityKind,
        fields: Vec<String>,
        parts: QueryParts,
        parameters: Vec<SqlValue>,
    ) -> Self {
        let query_text = parts.select_text(&fields);
        Self {
            query_text,
            parameters,
            fields,
            entity,
            parts,
        }
    }

    /// Structured parts of the query
    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    /// Number of placeholders in the query text
    pub fn placeholder_count(&self) -> usize {
        self.parts.placeholder_style.count_in(&self.query_text)
    }

    /// COUNT form of this query; binds the same parameters
    pub fn count_text(&self) -> String {
        self.parts.count_text()
    }

    /// Copy of this query with a different row window
    pub fn with_window(&self, limit: Option<u64>, offset: Option<u64>) -> Self {
        let mut parts = self.parts.clone();
        parts.limit = limit;
        parts.offset = offset;
        Self::new(self.entity, self.fields.clone(), parts, self.parameters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts(style: PlaceholderStyle) -> QueryParts {
        QueryParts {
            table: "leads".to_string(),
            predicates: vec![
                format!("\"projeto_id\" = {}", style.placeholder(1)),
                format!("\"status\" = {}", style.placeholder(2)),
            ],
            order_by: Some("nome ASC".to_string()),
            limit: Some(50),
            offset: None,
            placeholder_style: style,
        }
    }

    #[test]
    fn test_select_text() {
        let query = InterpretedQuery::new(
            EntityKind::Lead,
            vec!["id".to_string(), "nome".to_string()],
            parts(PlaceholderStyle::Numbered),
            vec![SqlValue::Integer(1), SqlValue::Text("novo".to_string())],
        );
        assert_eq!(
            query.query_text,
            "SELECT \"id\", \"nome\" FROM \"leads\" WHERE \"projeto_id\" = $1 AND \"status\" = $2 ORDER BY nome ASC LIMIT 50"
        );
        assert_eq!(query.placeholder_count(), 2);
    }

    #[test]
    fn test_count_text_drops_order_and_limit() {
        let query = InterpretedQuery::new(
            EntityKind::Lead,
            vec!["id".to_string()],
            parts(PlaceholderStyle::Question),
            vec![SqlValue::Integer(1), SqlValue::Text("novo".to_string())],
        );
        assert_eq!(
            query.count_text(),
            "SELECT COUNT(*) FROM \"leads\" WHERE \"projeto_id\" = ? AND \"status\" = ?"
        );
    }

    #[test]
    fn test_with_window() {
        let query = InterpretedQuery::new(
            EntityKind::Lead,
            vec!["id".to_string()],
            parts(PlaceholderStyle::Numbered),
            vec![SqlValue::Integer(1), SqlValue::Text("novo".to_string())],
        );
        let paged = query.with_window(Some(10), Some(20));
        assert!(paged.query_text.ends_with("LIMIT 10 OFFSET 20"));
        assert_eq!(paged.parameters, query.parameters);
    }

    #[test]
    fn test_sql_value_from_json() {
        assert_eq!(SqlValue::from_json(&json!(3)), Some(SqlValue::Integer(3)));
        assert_eq!(SqlValue::from_json(&json!(2.5)), Some(SqlValue::Float(2.5)));
        assert_eq!(SqlValue::from_json(&json!(true)), Some(SqlValue::Bool(true)));
        assert_eq!(
            SqlValue::from_json(&json!("x")),
            Some(SqlValue::Text("x".to_string()))
        );
        assert_eq!(SqlValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
