//! Viewer modes: a viewer's privilege level relative to one entity.

use std::fmt;

use mintnet_proto::{EntityId, EntityKind};

use super::context::Viewer;
use super::error::{SecurityError, SecurityResult};
use crate::error::Result;
use crate::membership::Role;

/// Privilege level of a viewer towards a specific entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewerMode {
    /// Not signed in.
    Anonymous,
    /// Signed in, no role on the entity.
    Authenticated,
    /// Team member of the entity.
    TeamMember,
    /// Admin of the entity, or the owner of a profile.
    Admin,
}

impl ViewerMode {
    /// Whether entities served in this mode go through the field filter.
    pub fn requires_filtering(&self) -> bool {
        matches!(self, ViewerMode::Anonymous | ViewerMode::Authenticated)
    }

    /// Whether the viewer may edit the entity, its visibility and memberships.
    pub fn can_administer(&self) -> bool {
        matches!(self, ViewerMode::Admin)
    }

    /// Require admin privileges for `action`.
    pub fn require_admin(&self, action: &str) -> SecurityResult<()> {
        if self.can_administer() {
            Ok(())
        } else {
            Err(SecurityError::PermissionDenied(format!(
                "{} requires admin access, viewer is {}",
                action, self
            )))
        }
    }

    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            ViewerMode::Anonymous => "anon",
            ViewerMode::Authenticated => "authenticated",
            ViewerMode::TeamMember => "team_member",
            ViewerMode::Admin => "admin",
        }
    }
}

impl fmt::Display for ViewerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Role> for ViewerMode {
    fn from(role: Role) -> Self {
        match role {
            Role::TeamMember => ViewerMode::TeamMember,
            Role::Admin => ViewerMode::Admin,
        }
    }
}

/// Lookup of the role a profile holds on an entity.
///
/// Implemented by the storage engine over its membership table.
pub trait RoleLookup {
    /// Highest role `profile` holds on `entity`, if any.
    fn role_of(&self, entity: EntityId, profile: EntityId) -> Result<Option<Role>>;
}

/// Resolves viewer modes through a [`RoleLookup`].
pub struct ModeResolver<'a, L: RoleLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: RoleLookup + ?Sized> ModeResolver<'a, L> {
    /// Create a resolver.
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Mode of `viewer` towards the entity `id` of kind `kind`.
    pub fn resolve(&self, viewer: &Viewer, kind: EntityKind, id: EntityId) -> Result<ViewerMode> {
        let Some(profile_id) = viewer.profile_id else {
            return Ok(ViewerMode::Anonymous);
        };

        if kind == EntityKind::Profile {
            return Ok(if profile_id == id {
                ViewerMode::Admin
            } else {
                ViewerMode::Authenticated
            });
        }

        Ok(self
            .lookup
            .role_of(id, profile_id)?
            .map(ViewerMode::from)
            .unwrap_or(ViewerMode::Authenticated))
    }
}
