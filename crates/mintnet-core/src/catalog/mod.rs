//! Entity catalog.
//!
//! The catalog describes the fields of every entity kind, their types and
//! which of them are controlled by the entity's visibility record.

pub mod builtin;
mod catalog;
mod entity;
mod field;
mod types;

pub use catalog::Catalog;
pub use entity::EntityDef;
pub use field::{FieldDef, FieldSensitivity};
pub use types::{FieldType, ScalarType};
