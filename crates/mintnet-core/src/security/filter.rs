//! Field-level visibility filtering.
//!
//! Applied to every entity served to a viewer whose mode requires it. Hidden
//! fields are replaced by their empty value: `Null` for scalars, an empty
//! array for list fields.

use mintnet_proto::Document;

use super::error::{SecurityError, SecurityResult};
use crate::catalog::EntityDef;
use crate::visibility::VisibilityRecord;

/// Field filter applied during result assembly.
pub struct FieldFilter;

impl FieldFilter {
    /// Return a copy of `entity` with every field hidden by `visibility`
    /// replaced by its empty value.
    ///
    /// Fields not named by the record pass through unchanged, as do hidden
    /// fields the document does not carry (partial projections stay
    /// partial). Fails if the record belongs to another entity.
    pub fn filter_by_visibility(
        entity: &Document,
        visibility: &VisibilityRecord,
    ) -> SecurityResult<Document> {
        if visibility.entity_id != entity.id {
            return Err(SecurityError::VisibilityMismatch {
                entity: entity.id,
                record: visibility.entity_id,
            });
        }

        let mut redacted = entity.clone();
        for field in visibility.hidden_fields() {
            if let Some(value) = redacted.fields.get_mut(field) {
                *value = value.empty_like();
            }
        }
        Ok(redacted)
    }

    /// Return a copy of `entity` with every gated field of its kind redacted.
    ///
    /// Used when an entity has to be served without its visibility record.
    pub fn redact_all(entity: &Document, def: &EntityDef) -> Document {
        let mut redacted = entity.clone();
        for field in def.gated_fields() {
            if let Some(value) = redacted.fields.get_mut(&field.name) {
                *value = field.field_type.empty_value();
            }
        }
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin;
    use mintnet_proto::{EntityId, EntityKind, Value};

    fn profile() -> Document {
        Document::new(EntityId([1; 16]), EntityKind::Profile)
            .with_field("username", "ab")
            .with_field("email", "a@b.com")
            .with_field("phone", "123")
            .with_field("skills", vec!["math", "physics"])
    }

    fn visibility() -> VisibilityRecord {
        VisibilityRecord::defaults_for(&builtin::profile(), EntityId([1; 16]))
            .with_flag("email", false)
            .with_flag("phone", true)
            .with_flag("skills", false)
    }

    #[test]
    fn test_hidden_scalar_becomes_null() {
        let filtered = FieldFilter::filter_by_visibility(&profile(), &visibility()).unwrap();
        assert_eq!(filtered.get("email"), Some(&Value::Null));
    }

    #[test]
    fn test_hidden_array_becomes_empty() {
        let filtered = FieldFilter::filter_by_visibility(&profile(), &visibility()).unwrap();
        assert_eq!(filtered.get("skills"), Some(&Value::StringArray(vec![])));
    }

    #[test]
    fn test_visible_and_ungated_pass_through() {
        let entity = profile();
        let filtered = FieldFilter::filter_by_visibility(&entity, &visibility()).unwrap();
        assert_eq!(filtered.get("phone"), entity.get("phone"));
        assert_eq!(filtered.get("username"), entity.get("username"));
        assert_eq!(filtered.id, entity.id);
    }

    #[test]
    fn test_example_profile() {
        let entity = Document::new(EntityId([9; 16]), EntityKind::Profile)
            .with_field("email", "a@b.com")
            .with_field("phone", "123")
            .with_field("username", "ab");
        let record = VisibilityRecord {
            entity_id: EntityId([9; 16]),
            kind: EntityKind::Profile,
            flags: [("email".to_string(), false), ("phone".to_string(), true)]
                .into_iter()
                .collect(),
        };

        let filtered = FieldFilter::filter_by_visibility(&entity, &record).unwrap();
        let expected = Document::new(EntityId([9; 16]), EntityKind::Profile)
            .with_field("email", Value::Null)
            .with_field("phone", "123")
            .with_field("username", "ab");
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_idempotent() {
        let once = FieldFilter::filter_by_visibility(&profile(), &visibility()).unwrap();
        let twice = FieldFilter::filter_by_visibility(&once, &visibility()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_not_mutated() {
        let entity = profile();
        let snapshot = entity.clone();
        let _ = FieldFilter::filter_by_visibility(&entity, &visibility()).unwrap();
        assert_eq!(entity, snapshot);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let entity = Document::new(EntityId([1; 16]), EntityKind::Profile).with_field("username", "ab");
        let filtered = FieldFilter::filter_by_visibility(&entity, &visibility()).unwrap();
        assert!(filtered.get("email").is_none());
    }

    #[test]
    fn test_mismatched_record_rejected() {
        let record = VisibilityRecord::defaults_for(&builtin::profile(), EntityId([2; 16]));
        let err = FieldFilter::filter_by_visibility(&profile(), &record).unwrap_err();
        assert!(matches!(err, SecurityError::VisibilityMismatch { .. }));
    }

    #[test]
    fn test_redact_all() {
        let def = builtin::profile();
        let redacted = FieldFilter::redact_all(&profile(), &def);
        assert_eq!(redacted.get("email"), Some(&Value::Null));
        assert_eq!(redacted.get("phone"), Some(&Value::Null));
        assert_eq!(redacted.get("skills"), Some(&Value::StringArray(vec![])));
        assert_eq!(redacted.get_str("username"), Some("ab"));
    }
}
