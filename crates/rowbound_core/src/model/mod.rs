//! Record data model.
//!
//! # Responsibility
//! - Declare table schemas and the scalar values a record can hold.
//!
//! # Invariants
//! - Schemas are immutable once built.
//! - Values form a closed union matching the schema type tags.

pub mod schema;
pub mod value;
