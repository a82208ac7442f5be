//! Database abstraction layer
//!
//! The export pipeline depends only on [`DataAccess`]; the PostgreSQL adapter
//! is one implementation, in-memory stubs in tests are another.

pub mod factory;
pub mod traits;

pub use factory::create_data_access;
pub use traits::{DataAccess, StoreRow};
