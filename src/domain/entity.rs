//! Exportable entity kinds
//!
//! The closed set of record types that can be exported, with the table each
//! one lives in and the columns a request may reference.

use super::records::{ClientRecord, CompetitorRecord, LeadRecord, MarketRecord, ProductRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column restricting an export to a single project
pub const PROJECT_SCOPE_COLUMN: &str = "projeto_id";

/// Column restricting an export to a single research within a project
pub const RESEARCH_SCOPE_COLUMN: &str = "pesquisa_id";

/// Kind of record an export targets
///
/// # Examples
///
/// ```
/// use mercator::domain::EntityKind;
/// use std::str::FromStr;
///
/// let kind = EntityKind::from_str("market").unwrap();
/// assert_eq!(kind.table(), "mercados");
/// assert!(EntityKind::from_str("invoice").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Market,
    Client,
    Competitor,
    Lead,
    Product,
}

impl EntityKind {
    /// Every supported entity kind
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Market,
        EntityKind::Client,
        EntityKind::Competitor,
        EntityKind::Lead,
        EntityKind::Product,
    ];

    /// Request-facing name of the entity
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Market => "market",
            EntityKind::Client => "client",
            EntityKind::Competitor => "competitor",
            EntityKind::Lead => "lead",
            EntityKind::Product => "product",
        }
    }

    /// Table holding the entity's rows
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Market => "mercados",
            EntityKind::Client => "clientes",
            EntityKind::Competitor => "concorrentes",
            EntityKind::Lead => "leads",
            EntityKind::Product => "produtos",
        }
    }

    /// All columns of the entity's record shape
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Market => MarketRecord::COLUMNS,
            EntityKind::Client => ClientRecord::COLUMNS,
            EntityKind::Competitor => CompetitorRecord::COLUMNS,
            EntityKind::Lead => LeadRecord::COLUMNS,
            EntityKind::Product => ProductRecord::COLUMNS,
        }
    }

    /// Canonical field list used when a request names no fields
    pub fn canonical_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Market => &[
                "id",
                "nome",
                "segmento",
                "tamanho_mercado",
                "crescimento_anual",
                "regiao",
            ],
            EntityKind::Client => &["id", "nome", "cnpj", "segmento", "cidade", "estado"],
            EntityKind::Competitor => &[
                "id",
                "nome",
                "website",
                "segmento",
                "porte",
                "market_share",
            ],
            EntityKind::Lead => &["id", "nome", "empresa", "email", "status", "score"],
            EntityKind::Product => &["id", "nome", "categoria", "preco", "sku"],
        }
    }

    /// Whether `column` belongs to the entity's record shape
    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "market" => Ok(EntityKind::Market),
            "client" => Ok(EntityKind::Client),
            "competitor" => Ok(EntityKind::Competitor),
            "lead" => Ok(EntityKind::Lead),
            "product" => Ok(EntityKind::Product),
            "" => Err("entity cannot be empty".to_string()),
            other => Err(format!(
                "Unknown entity '{}'. Must be one of: {}",
                other,
                EntityKind::ALL
                    .iter()
                    .map(EntityKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_entity_lists_choices() {
        let err = EntityKind::from_str("invoice").unwrap_err();
        assert!(err.contains("invoice"));
        assert!(err.contains("market, client, competitor, lead, product"));
    }

    #[test]
    fn test_canonical_fields_are_known_columns() {
        for kind in EntityKind::ALL {
            assert!(kind.canonical_fields().contains(&"id"));
            for field in kind.canonical_fields() {
                assert!(kind.has_column(field), "{kind}: {field}");
            }
        }
    }

    #[test]
    fn test_every_entity_has_scope_columns() {
        for kind in EntityKind::ALL {
            assert!(kind.has_column(PROJECT_SCOPE_COLUMN));
            assert!(kind.has_column(RESEARCH_SCOPE_COLUMN));
        }
    }
}
