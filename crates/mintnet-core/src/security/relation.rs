//! Visibility filtering across joined sub-entities.

use mintnet_proto::{Document, EntityId};

use super::error::SecurityResult;
use super::filter::FieldFilter;
use crate::membership::Role;
use crate::visibility::VisibilityRecord;

/// A joined sub-entity fetched together with its own visibility record.
#[derive(Debug, Clone, PartialEq)]
pub struct Related {
    /// The sub-entity.
    pub entity: Document,
    /// Its visibility record.
    pub visibility: VisibilityRecord,
}

impl Related {
    /// Pair an entity with its record.
    pub fn new(entity: Document, visibility: VisibilityRecord) -> Self {
        Self { entity, visibility }
    }

    /// Filtered copy of the sub-entity.
    pub fn filtered(&self) -> SecurityResult<Document> {
        FieldFilter::filter_by_visibility(&self.entity, &self.visibility)
    }
}

/// A membership row joined with the member's profile, e.g. one entry of
/// `organization.team_members`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRow {
    /// Role the profile holds on the parent entity.
    pub role: Role,
    /// When the membership started.
    pub joined_at: u64,
    /// The member's profile and its visibility record.
    pub profile: Related,
}

/// A membership row with the profile already filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberView {
    /// Role the profile holds on the parent entity.
    pub role: Role,
    /// When the membership started.
    pub joined_at: u64,
    /// The (possibly redacted) profile.
    pub profile: Document,
}

impl MemberView {
    /// ID of the member's profile.
    pub fn profile_id(&self) -> EntityId {
        self.profile.id
    }
}

/// Applies the field filter to collections of related entities.
pub struct RelationFilter;

impl RelationFilter {
    /// Filter every related entity, preserving length and order.
    pub fn filter_all(related: &[Related]) -> SecurityResult<Vec<Document>> {
        related.iter().map(Related::filtered).collect()
    }

    /// Filter the profile of every membership row, keeping role and order.
    pub fn filter_members(rows: &[MemberRow]) -> SecurityResult<Vec<MemberView>> {
        rows.iter()
            .map(|row| {
                Ok(MemberView {
                    role: row.role,
                    joined_at: row.joined_at,
                    profile: row.profile.filtered()?,
                })
            })
            .collect()
    }
}
