//! Core error types.

use mintnet_proto::{EntityId, EntityKind};
use thiserror::Error;

use crate::security::SecurityError;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Encoding or parsing error from the shared types.
    #[error("protocol error: {0}")]
    Protocol(#[from] mintnet_proto::Error),

    /// Access or visibility rule violated.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Record not found.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Slug or ID that was looked up.
        key: String,
    },

    /// Invite not found.
    #[error("invite not found: {0}")]
    InviteNotFound(EntityId),

    /// Entity exists without its companion visibility record.
    #[error("visibility record missing for {0}")]
    MissingVisibility(EntityId),

    /// The catalog has no definition for the entity kind.
    #[error("no definition for entity kind {0}")]
    UnknownEntity(EntityKind),

    /// Field is not part of the entity definition.
    #[error("unknown field {kind}.{field}")]
    UnknownField {
        /// Entity kind.
        kind: EntityKind,
        /// Field name.
        field: String,
    },

    /// Required field missing on creation.
    #[error("missing required field {kind}.{field}")]
    MissingField {
        /// Entity kind.
        kind: EntityKind,
        /// Field name.
        field: String,
    },

    /// Field value does not match the declared type.
    #[error("type mismatch for {kind}.{field}: expected {expected}")]
    TypeMismatch {
        /// Entity kind.
        kind: EntityKind,
        /// Field name.
        field: String,
        /// Declared type.
        expected: String,
    },

    /// Field is managed by the platform and cannot be written directly.
    #[error("field {0} is read-only")]
    ReadOnlyField(String),

    /// Slug already used by another entity of the same kind.
    #[error("{kind} slug already taken: {slug}")]
    SlugTaken {
        /// Entity kind.
        kind: EntityKind,
        /// The conflicting slug.
        slug: String,
    },

    /// No free slug found within the attempt limit.
    #[error("no free slug for base '{0}'")]
    SlugExhausted(String),

    /// Profile already holds the role on the entity.
    #[error("profile {profile} is already a member of {entity}")]
    AlreadyMember {
        /// Target entity.
        entity: EntityId,
        /// Profile.
        profile: EntityId,
    },

    /// A pending invite or request for the same membership exists.
    #[error("a pending invite for profile {profile} on {entity} already exists")]
    DuplicateInvite {
        /// Target entity.
        entity: EntityId,
        /// Profile.
        profile: EntityId,
    },

    /// Removing the membership would leave the entity without admins.
    #[error("cannot remove the last admin of {0}")]
    LastAdmin(EntityId),

    /// Event parent chain loops back on itself.
    #[error("event hierarchy cycle at {0}")]
    HierarchyCycle(EntityId),

    /// Event parent chain is deeper than allowed.
    #[error("event hierarchy deeper than {depth} levels")]
    HierarchyTooDeep {
        /// Depth at which the walk stopped.
        depth: usize,
    },

    /// Multi-tree transaction failed.
    #[error("transaction error: {0}")]
    Transaction(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a not-found error keyed by ID.
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Error::NotFound {
            kind,
            key: id.to_hex(),
        }
    }
}
