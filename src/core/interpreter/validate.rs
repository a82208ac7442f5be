//! Request validation
//!
//! Pure checks run before any store access. Every problem found is reported;
//! validation does not stop at the first error.

use crate::domain::{EntityKind, ExportRequest};
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

/// Outcome of validating a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate the shape of an export request
///
/// Checks that the entity is one of the supported kinds, that every field,
/// filter key and ordering column belongs to that entity, that filter values
/// are scalars and that the ordering clause is `<column> [ASC|DESC]`.
pub fn validate_request(request: &ExportRequest) -> ValidationReport {
    let mut errors = Vec::new();

    let entity = match request.entity.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("entity is required".to_string());
            None
        }
        Some(name) => match EntityKind::from_str(name) {
            Ok(kind) => Some(kind),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    if let Some(fields) = &request.fields {
        let mut seen = HashSet::new();
        for field in fields {
            if !is_identifier(field) {
                errors.push(format!("invalid field name '{field}'"));
                continue;
            }
            if !seen.insert(field.as_str()) {
                errors.push(format!("duplicate field '{field}'"));
            }
            if let Some(kind) = entity {
                if !kind.has_column(field) {
                    errors.push(format!("unknown field '{field}' for entity '{kind}'"));
                }
            }
        }
    }

    for (column, value) in &request.filters {
        if !is_identifier(column) {
            errors.push(format!("invalid filter column '{column}'"));
        } else if let Some(kind) = entity {
            if !kind.has_column(column) {
                errors.push(format!("unknown filter column '{column}' for entity '{kind}'"));
            }
        }
        if value.is_array() || value.is_object() {
            errors.push(format!("filter '{column}' must be a scalar value"));
        }
    }

    if let Some(order_by) = &request.order_by {
        match parse_order_by(order_by) {
            Some(column) => {
                if let Some(kind) = entity {
                    if !kind.has_column(column) {
                        errors.push(format!(
                            "unknown orderBy column '{column}' for entity '{kind}'"
                        ));
                    }
                }
            }
            None => errors.push(format!(
                "invalid orderBy '{order_by}', expected '<column> [ASC|DESC]'"
            )),
        }
    }

    ValidationReport::from_errors(errors)
}

/// Column of a `<column> [ASC|DESC]` clause, or `None` if malformed
pub(crate) fn parse_order_by(order_by: &str) -> Option<&str> {
    let mut tokens = order_by.split_whitespace();
    let column = tokens.next()?;
    if !is_identifier(column) {
        return None;
    }
    match tokens.next() {
        None => Some(column),
        Some(direction)
            if direction.eq_ignore_ascii_case("asc") || direction.eq_ignore_ascii_case("desc") =>
        {
            tokens.next().is_none().then_some(column)
        }
        Some(_) => None,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
