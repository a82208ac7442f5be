//! Default field sets
//!
//! The field list an export falls back to when the request names none. The
//! interpreter is handed one of these at construction, so deployments (and
//! tests) can swap the canonical lists without touching global state.

use crate::domain::{EntityKind, MercatorError, Result};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Per-entity default field lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFieldSets {
    sets: HashMap<EntityKind, Vec<String>>,
}

impl DefaultFieldSets {
    /// The built-in canonical lists
    pub fn canonical() -> Self {
        let sets = EntityKind::ALL
            .iter()
            .map(|kind| {
                let fields = kind
                    .canonical_fields()
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                (*kind, fields)
            })
            .collect();
        Self { sets }
    }

    /// Replace the default list for one entity
    ///
    /// # Errors
    ///
    /// Returns a validation error if the list is empty or names a column the
    /// entity does not have.
    pub fn with_override<I, S>(mut self, kind: EntityKind, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(MercatorError::validation(format!(
                "default field list for '{kind}' cannot be empty"
            )));
        }

        let unknown: Vec<String> = fields
            .iter()
            .filter(|f| !kind.has_column(f))
            .map(|f| format!("unknown field '{f}' in default field list for '{kind}'"))
            .collect();
        if !unknown.is_empty() {
            return Err(MercatorError::Validation(unknown));
        }

        self.sets.insert(kind, fields);
        Ok(self)
    }

    /// Canonical lists with overrides keyed by entity name
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown entity names or invalid lists.
    pub fn from_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut sets = Self::canonical();
        for (name, fields) in overrides {
            let kind = EntityKind::from_str(name).map_err(MercatorError::validation)?;
            sets = sets.with_override(kind, fields.iter().cloned())?;
        }
        Ok(sets)
    }

    /// Default fields for `kind`
    pub fn for_entity(&self, kind: EntityKind) -> &[String] {
        self.sets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for DefaultFieldSets {
    fn default() -> Self {
        Self::canonical()
    }
}
