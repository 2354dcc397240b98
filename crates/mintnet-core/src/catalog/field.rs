//! Field definitions for entities.

use super::types::{FieldType, ScalarType};

/// Sensitivity class of a visibility-gated field.
///
/// Decides the flag a freshly created visibility record starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldSensitivity {
    /// Descriptive data, visible to everyone until the owner hides it.
    #[default]
    Public,
    /// Contact details and similar, hidden until the owner publishes it.
    Private,
}

impl FieldSensitivity {
    /// Initial visibility flag for fields of this class.
    pub fn default_visible(&self) -> bool {
        matches!(self, FieldSensitivity::Public)
    }
}

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Whether the field is required on creation.
    pub required: bool,
    /// Visibility gate. `None` means the field is always served.
    pub gate: Option<FieldSensitivity>,
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            gate: None,
        }
    }

    /// Create an optional scalar field.
    pub fn optional(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::OptionalScalar(scalar),
            required: false,
            gate: None,
        }
    }

    /// Create an array field.
    pub fn array(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::ArrayScalar(scalar),
            required: false,
            gate: None,
        }
    }

    /// Gate the field, visible by default.
    pub fn public(mut self) -> Self {
        self.gate = Some(FieldSensitivity::Public);
        self
    }

    /// Gate the field, hidden by default.
    pub fn private(mut self) -> Self {
        self.gate = Some(FieldSensitivity::Private);
        self
    }

    /// Check if the field is controlled by the visibility record.
    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }
}
