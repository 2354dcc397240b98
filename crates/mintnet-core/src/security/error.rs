//! Security-specific error types.

use mintnet_proto::{EntityId, EntityKind};
use thiserror::Error;

/// Security-related errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Permission denied for the requested operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Visibility record handed to the filter belongs to another entity.
    #[error("visibility record of {record} does not belong to entity {entity}")]
    VisibilityMismatch {
        /// Entity being filtered.
        entity: EntityId,
        /// Entity named by the visibility record.
        record: EntityId,
    },

    /// Visibility update names a field that is not gated.
    #[error("field {kind}.{field} has no visibility flag")]
    UnknownVisibilityField {
        /// Entity kind.
        kind: EntityKind,
        /// Field name.
        field: String,
    },

    /// Invite or request cannot move from its current state.
    #[error("invalid invite transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Profile holds no membership on the entity.
    #[error("profile {profile} is not a member of {entity}")]
    NotAMember {
        /// Target entity.
        entity: EntityId,
        /// Profile.
        profile: EntityId,
    },
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
