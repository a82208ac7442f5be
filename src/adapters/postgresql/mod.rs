//! PostgreSQL database integration
//!
//! Read-only access to the market research tables: pooled connections,
//! prepared statements with typed bind values, and row decoding.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::{redact_connection_string, PostgreSQLClient};
pub use models::{bind_parameters, decode_row, NumericF64};
