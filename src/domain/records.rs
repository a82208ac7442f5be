//! Typed row shapes
//!
//! Rows coming out of the store are mapped at the executor boundary into one
//! record struct per entity kind, wrapped in the [`EntityRow`] tagged enum.
//! Renderers read cells through [`EntityRow::value`], so a field name that is
//! not part of the entity's shape can never silently produce data.

use super::entity::EntityKind;
use super::errors::StoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single cell value as seen by renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl CellValue {
    /// Whether the value should be written as a number by typed formats
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

/// Date or timestamp column value
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DD HH:MM:SS[.f]` timestamps
/// (taken as UTC) and plain `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Temporal {
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Temporal {
    /// Calendar date of the value
    pub fn date(&self) -> NaiveDate {
        match self {
            Temporal::Date(date) => *date,
            Temporal::Timestamp(ts) => ts.date_naive(),
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(Temporal::Timestamp(ts.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Temporal::Timestamp(naive.and_utc()));
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(Temporal::Date)
    }
}

impl<'de> Deserialize<'de> for Temporal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Temporal::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid date or timestamp: {raw}"))
        })
    }
}

/// Field types allowed in a record shape
pub trait RecordField: Clone + Into<CellValue> {
    /// Collapse timestamps to their calendar date; no-op for other types
    fn normalize_date(&mut self) {}
}

impl RecordField for i64 {}
impl RecordField for f64 {}
impl RecordField for bool {}
impl RecordField for String {}
impl RecordField for serde_json::Value {}

impl RecordField for Temporal {
    fn normalize_date(&mut self) {
        *self = Temporal::Date(self.date());
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        CellValue::Json(value)
    }
}

impl From<Temporal> for CellValue {
    fn from(value: Temporal) -> Self {
        match value {
            Temporal::Date(date) => CellValue::Date(date),
            Temporal::Timestamp(ts) => CellValue::Timestamp(ts),
        }
    }
}

macro_rules! entity_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident : $ty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $( pub $field: Option<$ty>, )+
        }

        impl $name {
            /// Column names, in declaration order
            pub const COLUMNS: &'static [&'static str] = &[$( stringify!($field) ),+];

            /// Cell for `column`, or `None` when the column is not part of the shape
            pub fn value(&self, column: &str) -> Option<CellValue> {
                match column {
                    $(
                        stringify!($field) => Some(
                            self.$field.clone().map(Into::into).unwrap_or(CellValue::Null),
                        ),
                    )+
                    _ => None,
                }
            }

            fn normalize_dates(&mut self) {
                $(
                    if let Some(value) = self.$field.as_mut() {
                        RecordField::normalize_date(value);
                    }
                )+
            }
        }
    };
}

entity_record! {
    /// Market segment under study
    MarketRecord {
        id: i64,
        nome: String,
        segmento: String,
        tamanho_mercado: f64,
        crescimento_anual: f64,
        regiao: String,
        descricao: String,
        tendencias: serde_json::Value,
        projeto_id: i64,
        pesquisa_id: i64,
        created_at: Temporal,
        updated_at: Temporal,
    }
}

entity_record! {
    /// Client account
    ClientRecord {
        id: i64,
        nome: String,
        cnpj: String,
        segmento: String,
        cidade: String,
        estado: String,
        email: String,
        telefone: String,
        ativo: bool,
        projeto_id: i64,
        pesquisa_id: i64,
        created_at: Temporal,
        updated_at: Temporal,
    }
}

entity_record! {
    /// Competitor profile
    CompetitorRecord {
        id: i64,
        nome: String,
        website: String,
        segmento: String,
        porte: String,
        market_share: f64,
        pontos_fortes: String,
        pontos_fracos: String,
        projeto_id: i64,
        pesquisa_id: i64,
        created_at: Temporal,
        updated_at: Temporal,
    }
}

entity_record! {
    /// Sales lead
    LeadRecord {
        id: i64,
        nome: String,
        empresa: String,
        email: String,
        telefone: String,
        cargo: String,
        status: String,
        score: i64,
        origem: String,
        projeto_id: i64,
        pesquisa_id: i64,
        created_at: Temporal,
        updated_at: Temporal,
    }
}

entity_record! {
    /// Product in the catalogue
    ProductRecord {
        id: i64,
        nome: String,
        categoria: String,
        preco: f64,
        sku: String,
        descricao: String,
        disponivel: bool,
        atributos: serde_json::Value,
        projeto_id: i64,
        pesquisa_id: i64,
        created_at: Temporal,
        updated_at: Temporal,
    }
}

/// A typed row, tagged by entity kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum EntityRow {
    Market(MarketRecord),
    Client(ClientRecord),
    Competitor(CompetitorRecord),
    Lead(LeadRecord),
    Product(ProductRecord),
}

impl EntityRow {
    /// Map a column-name → value object from the store into the entity's shape
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedRow`] when a column's value does not fit
    /// the record field type.
    pub fn from_json(
        kind: EntityKind,
        row: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, StoreError> {
        let value = serde_json::Value::Object(row);
        let malformed = |e: serde_json::Error| StoreError::MalformedRow(format!("{kind}: {e}"));

        Ok(match kind {
            EntityKind::Market => EntityRow::Market(serde_json::from_value(value).map_err(malformed)?),
            EntityKind::Client => EntityRow::Client(serde_json::from_value(value).map_err(malformed)?),
            EntityKind::Competitor => {
                EntityRow::Competitor(serde_json::from_value(value).map_err(malformed)?)
            }
            EntityKind::Lead => EntityRow::Lead(serde_json::from_value(value).map_err(malformed)?),
            EntityKind::Product => {
                EntityRow::Product(serde_json::from_value(value).map_err(malformed)?)
            }
        })
    }

    /// Entity kind of the row
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRow::Market(_) => EntityKind::Market,
            EntityRow::Client(_) => EntityKind::Client,
            EntityRow::Competitor(_) => EntityKind::Competitor,
            EntityRow::Lead(_) => EntityKind::Lead,
            EntityRow::Product(_) => EntityKind::Product,
        }
    }

    /// Cell for `field`; unknown fields read as [`CellValue::Null`]
    pub fn value(&self, field: &str) -> CellValue {
        let cell = match self {
            EntityRow::Market(record) => record.value(field),
            EntityRow::Client(record) => record.value(field),
            EntityRow::Competitor(record) => record.value(field),
            EntityRow::Lead(record) => record.value(field),
            EntityRow::Product(record) => record.value(field),
        };
        cell.unwrap_or(CellValue::Null)
    }

    /// Replace every timestamp with its calendar date
    pub fn normalize_dates(&mut self) {
        match self {
            EntityRow::Market(record) => record.normalize_dates(),
            EntityRow::Client(record) => record.normalize_dates(),
            EntityRow::Competitor(record) => record.normalize_dates(),
            EntityRow::Lead(record) => record.normalize_dates(),
            EntityRow::Product(record) => record.normalize_dates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_json_maps_selected_columns() {
        let row = EntityRow::from_json(
            EntityKind::Market,
            object(json!({"id": 1, "nome": "Mercado A", "segmento": "Tech"})),
        )
        .unwrap();

        assert_eq!(row.kind(), EntityKind::Market);
        assert_eq!(row.value("id"), CellValue::Integer(1));
        assert_eq!(row.value("nome"), CellValue::Text("Mercado A".to_string()));
        assert_eq!(row.value("regiao"), CellValue::Null);
        assert_eq!(row.value("no_such_column"), CellValue::Null);
    }

    #[test]
    fn test_from_json_rejects_wrong_type() {
        let result = EntityRow::from_json(EntityKind::Lead, object(json!({"score": "high"})));
        assert!(matches!(result, Err(StoreError::MalformedRow(_))));
    }

    #[test]
    fn test_temporal_formats() {
        assert_eq!(
            Temporal::parse("2024-03-05"),
            Some(Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        let ts = Temporal::parse("2024-03-05T23:10:00-03:00").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert!(matches!(
            Temporal::parse("2024-03-05 10:00:00"),
            Some(Temporal::Timestamp(_))
        ));
        assert!(Temporal::parse("yesterday").is_none());
    }

    #[test]
    fn test_normalize_dates_collapses_timestamps() {
        let mut row = EntityRow::from_json(
            EntityKind::Client,
            object(json!({"id": 7, "created_at": "2024-01-15T08:30:00Z"})),
        )
        .unwrap();
        assert!(matches!(row.value("created_at"), CellValue::Timestamp(_)));

        row.normalize_dates();
        assert_eq!(
            row.value("created_at"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(row.value("id"), CellValue::Integer(7));
    }

    #[test]
    fn test_json_column_kept_structured() {
        let row = EntityRow::from_json(
            EntityKind::Product,
            object(json!({"atributos": {"cor": "azul"}})),
        )
        .unwrap();
        assert_eq!(row.value("atributos"), CellValue::Json(json!({"cor": "azul"})));
    }
}
