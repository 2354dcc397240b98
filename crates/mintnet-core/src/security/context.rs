//! Request-scoped viewer identity.

use mintnet_proto::EntityId;

/// The person looking at a page.
///
/// Built per request from the identity asserted by the authentication
/// service; carries no roles itself. Roles are looked up per target entity
/// by the [`ModeResolver`](super::ModeResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer {
    /// Profile of the signed-in user, if any.
    pub profile_id: Option<EntityId>,
}

impl Viewer {
    /// A viewer without session.
    pub fn anonymous() -> Self {
        Self { profile_id: None }
    }

    /// A signed-in viewer.
    pub fn signed_in(profile_id: EntityId) -> Self {
        Self {
            profile_id: Some(profile_id),
        }
    }

    /// Check if the viewer is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.profile_id.is_some()
    }

    /// Check if the viewer is the given profile.
    pub fn is(&self, profile_id: EntityId) -> bool {
        self.profile_id == Some(profile_id)
    }
}
