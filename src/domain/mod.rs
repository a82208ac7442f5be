//! Domain models and types for Mercator.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Entity kinds** ([`EntityKind`]) - the closed set of exportable record types
//! - **Requests** ([`ExportRequest`]) - the declarative "export this data" input
//! - **Interpreted queries** ([`InterpretedQuery`]) - placeholder-only query text plus bind values
//! - **Typed rows** ([`EntityRow`], [`CellValue`]) - one record shape per entity kind
//! - **Error types** ([`MercatorError`], [`StoreError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MercatorError>`]:
//!
//! ```rust
//! use mercator::domain::{ExportRequest, Result};
//!
//! fn example() -> Result<()> {
//!     let request = ExportRequest::from_json_str(r#"{"entity": "market"}"#)?;
//!     assert_eq!(request.entity.as_deref(), Some("market"));
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod errors;
pub mod query;
pub mod records;
pub mod request;
pub mod result;

pub use entity::{EntityKind, PROJECT_SCOPE_COLUMN, RESEARCH_SCOPE_COLUMN};
pub use errors::{MercatorError, StoreError};
pub use query::{InterpretedQuery, PlaceholderStyle, QueryParts, SqlValue};
pub use records::{
    CellValue, ClientRecord, CompetitorRecord, EntityRow, LeadRecord, MarketRecord,
    ProductRecord, Temporal,
};
pub use request::ExportRequest;
pub use result::Result;
