//! Entity documents: one entity instance with its named fields.

use std::collections::BTreeMap;

use rkyv::{Archive, Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::error::Error;
use crate::value::Value;

/// An entity instance.
///
/// Field order is stable (sorted by name) so that encoded documents and
/// rendered JSON do not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Document {
    /// Entity identifier.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Field values by name.
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a string field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Set a field value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// The document's slug, if it has one.
    pub fn slug(&self) -> Option<&str> {
        self.get_str("slug")
    }

    /// Serialize the document to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a document from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
