//! Schema-driven resources: one description per business table replaces a
//! hand-written handler per table.

pub mod query;
pub mod registry;
pub mod schema;
pub mod validate;

/// A row as exchanged with clients and stores
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use query::{ColumnFilter, ListQuery};
pub use registry::ResourceRegistry;
pub use schema::{FieldKind, FieldSpec, ResourceSchema, SortOrder};
pub use validate::{validate_payload, ValidationFailure, WriteMode};
