//! Entity definitions.

use super::field::FieldDef;
use mintnet_proto::EntityKind;

/// An entity definition: the field layout of one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields controlled by the visibility record.
    pub fn gated_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_gated())
    }

    /// Fields that must be present on creation.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Check if the named field is visibility-gated.
    pub fn is_gated(&self, name: &str) -> bool {
        self.get_field(name).is_some_and(FieldDef::is_gated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldType, ScalarType};

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new(EntityKind::Profile)
            .with_field(FieldDef::new("username", FieldType::Scalar(ScalarType::String)))
            .with_field(FieldDef::optional("email", ScalarType::String).private())
            .with_field(FieldDef::array("skills", ScalarType::String).public());

        assert_eq!(entity.fields.len(), 3);
        assert_eq!(entity.gated_fields().count(), 2);
        assert_eq!(entity.required_fields().count(), 1);
        assert!(entity.is_gated("email"));
        assert!(!entity.is_gated("username"));
        assert!(!entity.is_gated("nonexistent"));
    }
}
