//! Catalog of entity definitions.

use std::collections::BTreeMap;

use mintnet_proto::{Document, EntityKind, Value};

use super::builtin;
use super::entity::EntityDef;
use crate::error::{Error, Result};

/// Entity definitions by kind.
///
/// Constructed once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: BTreeMap<EntityKind, EntityDef>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform catalog with profile, organization, event and project.
    pub fn builtin() -> Self {
        Self::new()
            .with_entity(builtin::profile())
            .with_entity(builtin::organization())
            .with_entity(builtin::event())
            .with_entity(builtin::project())
    }

    /// Add or replace an entity definition.
    pub fn with_entity(mut self, def: EntityDef) -> Self {
        self.entities.insert(def.kind, def);
        self
    }

    /// Get the definition of a kind.
    pub fn get(&self, kind: EntityKind) -> Option<&EntityDef> {
        self.entities.get(&kind)
    }

    /// Get the definition of a kind or fail.
    pub fn entity(&self, kind: EntityKind) -> Result<&EntityDef> {
        self.get(kind).ok_or(Error::UnknownEntity(kind))
    }

    /// Iterate over all definitions.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    /// Check that every given field exists on the kind and has a matching type.
    pub fn validate_fields(
        &self,
        kind: EntityKind,
        fields: &BTreeMap<String, Value>,
    ) -> Result<()> {
        let def = self.entity(kind)?;
        for (name, value) in fields {
            let field = def.get_field(name).ok_or_else(|| Error::UnknownField {
                kind,
                field: name.clone(),
            })?;
            if !field.field_type.accepts(value) {
                return Err(Error::TypeMismatch {
                    kind,
                    field: name.clone(),
                    expected: field.field_type.describe(),
                });
            }
        }
        Ok(())
    }

    /// Validate a complete document: known, well-typed fields and all
    /// required fields present.
    pub fn validate_document(&self, doc: &Document) -> Result<()> {
        self.validate_fields(doc.kind, &doc.fields)?;
        let def = self.entity(doc.kind)?;
        if let Some(missing) = def.required_fields().find(|f| !doc.fields.contains_key(&f.name)) {
            return Err(Error::MissingField {
                kind: doc.kind,
                field: missing.name.clone(),
            });
        }
        Ok(())
    }
}
