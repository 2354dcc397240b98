//! Visibility records.
//!
//! Every entity has exactly one companion visibility record holding one
//! boolean flag per gated field of its kind. `true` means the field is shown
//! to anonymous and unprivileged viewers, `false` means it is redacted.

use std::collections::BTreeMap;

use mintnet_proto::{EntityId, EntityKind};
use rkyv::{Archive, Deserialize, Serialize};

use crate::catalog::EntityDef;
use crate::error::{Error, Result};
use crate::security::{SecurityError, SecurityResult};

/// Per-entity field visibility flags.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct VisibilityRecord {
    /// The entity this record belongs to.
    pub entity_id: EntityId,
    /// Kind of that entity.
    pub kind: EntityKind,
    /// Flag per gated field, keyed by field name.
    pub flags: BTreeMap<String, bool>,
}

impl VisibilityRecord {
    /// Record with the defaults of the kind's sensitivity classes.
    pub fn defaults_for(def: &EntityDef, entity_id: EntityId) -> Self {
        let flags = def
            .gated_fields()
            .filter_map(|f| f.gate.map(|gate| (f.name.clone(), gate.default_visible())))
            .collect();
        Self {
            entity_id,
            kind: def.kind,
            flags,
        }
    }

    /// Record hiding every gated field of the kind.
    pub fn all_hidden(def: &EntityDef, entity_id: EntityId) -> Self {
        let flags = def
            .gated_fields()
            .map(|f| (f.name.clone(), false))
            .collect();
        Self {
            entity_id,
            kind: def.kind,
            flags,
        }
    }

    /// Builder-style flag setter. Does not validate the field name.
    pub fn with_flag(mut self, field: impl Into<String>, visible: bool) -> Self {
        self.flags.insert(field.into(), visible);
        self
    }

    /// Flag for a field; `None` for fields the record does not gate.
    pub fn is_visible(&self, field: &str) -> Option<bool> {
        self.flags.get(field).copied()
    }

    /// Names of the fields that are currently hidden.
    pub fn hidden_fields(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(name, _)| name.as_str())
    }

    /// Apply a partial update.
    ///
    /// All names are checked before anything changes, so a rejected update
    /// leaves the record untouched.
    pub fn apply(&mut self, update: &VisibilityUpdate, def: &EntityDef) -> SecurityResult<()> {
        if let Some(field) = update.flags.keys().find(|name| !def.is_gated(name)) {
            return Err(SecurityError::UnknownVisibilityField {
                kind: def.kind,
                field: field.clone(),
            });
        }
        for (name, visible) in &update.flags {
            self.flags.insert(name.clone(), *visible);
        }
        Ok(())
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// A partial change to a visibility record, as submitted from an entity's
/// settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityUpdate {
    /// New flags by field name.
    pub flags: BTreeMap<String, bool>,
}

impl VisibilityUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one flag.
    pub fn set(mut self, field: impl Into<String>, visible: bool) -> Self {
        self.flags.insert(field.into(), visible);
        self
    }

    /// Check if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(String, bool)> for VisibilityUpdate {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}
