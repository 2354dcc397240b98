//! Team and admin memberships, invites and join requests.

use std::fmt;

use mintnet_proto::{EntityId, EntityKind};
use rkyv::{Archive, Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::security::{SecurityError, SecurityResult};
use crate::storage::current_timestamp;

/// Role a profile holds on an organization, event or project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum Role {
    /// Listed in the entity's team.
    TeamMember,
    /// May edit the entity, its visibility and its memberships.
    Admin,
}

impl Role {
    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::TeamMember => "team_member",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One membership row: a profile holding a role on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct MemberRecord {
    /// The organization, event or project.
    pub entity_id: EntityId,
    /// Kind of that entity.
    pub entity_kind: EntityKind,
    /// The member's profile.
    pub profile_id: EntityId,
    /// Held role.
    pub role: Role,
    /// When the membership was created, microseconds since epoch.
    pub joined_at: u64,
}

impl MemberRecord {
    /// Create a membership starting now.
    pub fn new(
        entity_id: EntityId,
        entity_kind: EntityKind,
        profile_id: EntityId,
        role: Role,
    ) -> Self {
        Self {
            entity_id,
            entity_kind,
            profile_id,
            role,
            joined_at: current_timestamp(),
        }
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

/// Who started a pending membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum Direction {
    /// Entity admins invited the profile.
    Invite,
    /// The profile asked to join.
    Request,
}

/// Lifecycle of an invite or request.
///
/// ```text
/// Pending --accept--> Accepted
///    |----reject--> Rejected
///    `----cancel--> Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum InviteStatus {
    /// Waiting for an answer.
    Pending,
    /// Answered with yes; the membership exists.
    Accepted,
    /// Answered with no.
    Rejected,
    /// Withdrawn by the side that started it.
    Canceled,
}

impl InviteStatus {
    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Rejected => "rejected",
            InviteStatus::Canceled => "canceled",
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_final(&self) -> bool {
        !matches!(self, InviteStatus::Pending)
    }

    /// Move to `to`, or fail if the lifecycle does not allow it.
    pub fn transition(self, to: InviteStatus) -> SecurityResult<InviteStatus> {
        match (self, to) {
            (InviteStatus::Pending, InviteStatus::Accepted)
            | (InviteStatus::Pending, InviteStatus::Rejected)
            | (InviteStatus::Pending, InviteStatus::Canceled) => Ok(to),
            (from, to) => Err(SecurityError::InvalidTransition {
                from: from.name().to_string(),
                to: to.name().to_string(),
            }),
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pending or answered invite or join request.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct Invite {
    /// Invite identifier.
    pub id: EntityId,
    /// Target organization, event or project.
    pub entity_id: EntityId,
    /// Kind of the target.
    pub entity_kind: EntityKind,
    /// The invited or requesting profile.
    pub profile_id: EntityId,
    /// Role granted on acceptance.
    pub role: Role,
    /// Who started it.
    pub direction: Direction,
    /// Current status.
    pub status: InviteStatus,
    /// Creation time, microseconds since epoch.
    pub created_at: u64,
    /// Time of the last status change.
    pub updated_at: u64,
}

impl Invite {
    /// Create a pending invite or request.
    pub fn pending(
        entity_id: EntityId,
        entity_kind: EntityKind,
        profile_id: EntityId,
        role: Role,
        direction: Direction,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: EntityId::generate(),
            entity_id,
            entity_kind,
            profile_id,
            role,
            direction,
            status: InviteStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status change.
    pub fn transition(&mut self, to: InviteStatus) -> SecurityResult<()> {
        self.status = self.status.transition(to)?;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Whether this invite targets the same membership as another one.
    pub fn same_membership(&self, entity_id: EntityId, profile_id: EntityId, role: Role) -> bool {
        self.entity_id == entity_id && self.profile_id == profile_id && self.role == role
    }

    /// Serialize the invite to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize an invite from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
