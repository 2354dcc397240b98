//! MINTnet shared types.
//!
//! This crate defines the types exchanged between the storage layer, the
//! visibility filters and the HTTP gateway. Stored types derive
//! `rkyv::Archive`, `rkyv::Serialize` and `rkyv::Deserialize`.
//!
//! # Modules
//!
//! - [`value`] - Runtime field values
//! - [`entity`] - Entity kinds and identifiers
//! - [`document`] - Entity instances
//! - [`error`] - Encoding and parsing errors

pub mod document;
pub mod entity;
pub mod error;
pub mod value;

pub use document::Document;
pub use entity::{EntityId, EntityKind, ENTITY_ID_SIZE};
pub use error::Error;
pub use value::Value;
