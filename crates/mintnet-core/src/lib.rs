//! MINTnet Core - entity catalog, visibility filtering, memberships and storage.
//!
//! This crate holds everything between the HTTP surface and the database:
//! which fields each entity kind has, which of them a viewer may see, who
//! administers what, and how it is all persisted.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod catalog;
pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod membership;
pub mod platform;
pub mod security;
pub mod slug;
pub mod storage;
pub mod visibility;

pub use catalog::{Catalog, EntityDef, FieldDef, FieldSensitivity, FieldType, ScalarType};
pub use error::{Error, Result};
pub use hierarchy::{EventHierarchy, MAX_EVENT_DEPTH};
pub use loader::{Loaded, Loader};
pub use membership::{Direction, Invite, InviteStatus, MemberRecord, Role};
pub use platform::Platform;
pub use storage::{DeleteResult, Record, StorageConfig, StorageEngine};
pub use visibility::{VisibilityRecord, VisibilityUpdate};

// Security exports
pub use security::{
    FieldFilter, MemberRow, MemberView, ModeResolver, RelationFilter, Related, RoleLookup,
    SecurityError, SecurityResult, Viewer, ViewerMode,
};

/// Re-export shared types.
pub use mintnet_proto as proto;
