//! The platform service handle.
//!
//! [`Platform`] bundles the storage engine and catalog and is passed
//! explicitly to whoever serves requests. All writes check the actor's mode
//! towards the target entity before touching storage; all reads go through
//! the [`Loader`].

use std::collections::BTreeMap;
use std::sync::Arc;

use mintnet_proto::{Document, EntityId, EntityKind, Value};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::hierarchy::EventHierarchy;
use crate::loader::Loader;
use crate::membership::{Direction, Invite, InviteStatus, MemberRecord, Role};
use crate::security::{ModeResolver, SecurityError, Viewer, ViewerMode};
use crate::slug::{slugify, unique_slug};
use crate::storage::{parent_of, DeleteResult, StorageConfig, StorageEngine};
use crate::visibility::{VisibilityRecord, VisibilityUpdate};

/// Number of times creation retries when a concurrent insert takes the slug.
const SLUG_RETRIES: usize = 3;

/// Field set on creation that is never written directly.
const SLUG_FIELD: &str = "slug";

/// Shared handle to storage and catalog.
#[derive(Clone)]
pub struct Platform {
    storage: Arc<StorageEngine>,
    catalog: Arc<Catalog>,
}

impl Platform {
    /// Create a platform over existing storage and catalog.
    pub fn new(storage: Arc<StorageEngine>, catalog: Arc<Catalog>) -> Self {
        Self { storage, catalog }
    }

    /// Open storage and use the built-in catalog.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let storage = StorageEngine::open(config)?;
        Ok(Self::new(Arc::new(storage), Arc::new(Catalog::builtin())))
    }

    /// The storage engine.
    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A loader for serving entities to viewers.
    pub fn loader(&self) -> Loader<'_> {
        Loader::new(&self.storage, &self.catalog)
    }

    /// Resolve a slug to an entity ID.
    pub fn resolve(&self, kind: EntityKind, slug: &str) -> Result<EntityId> {
        self.storage
            .resolve_slug(kind, slug)?
            .ok_or_else(|| Error::NotFound {
                kind,
                key: slug.to_string(),
            })
    }

    /// Mode of `viewer` towards an existing entity.
    pub fn mode_of(&self, viewer: &Viewer, kind: EntityKind, id: EntityId) -> Result<ViewerMode> {
        self.storage.fetch(kind, id)?;
        ModeResolver::new(self.storage.as_ref()).resolve(viewer, kind, id)
    }

    /// Create an entity.
    ///
    /// `name` seeds the slug and, for profiles, defaults the username. The
    /// entity starts with the default visibility of its kind. Organizations,
    /// events and projects need a signed-in creator, who becomes their first
    /// admin.
    pub fn create_entity(
        &self,
        kind: EntityKind,
        name: &str,
        mut fields: BTreeMap<String, Value>,
        creator: &Viewer,
    ) -> Result<Document> {
        if fields.contains_key(SLUG_FIELD) {
            return Err(Error::ReadOnlyField(SLUG_FIELD.to_string()));
        }
        let creator_id = match (kind.has_members(), creator.profile_id) {
            (true, None) => {
                return Err(SecurityError::PermissionDenied(format!(
                    "creating {} requires a signed-in profile",
                    kind.plural()
                ))
                .into())
            }
            (true, Some(id)) => {
                self.storage.fetch(EntityKind::Profile, id)?;
                Some(id)
            }
            (false, _) => None,
        };

        let name_field = if kind == EntityKind::Profile { "username" } else { "name" };
        fields
            .entry(name_field.to_string())
            .or_insert_with(|| Value::from(name));

        if kind == EntityKind::Event {
            if let Some(parent) = fields.get("parent_event_id").and_then(Value::as_uuid) {
                self.storage.fetch(EntityKind::Event, EntityId(*parent))?;
            }
        }

        let def = self.catalog.entity(kind)?;
        let base = slugify(name, kind);
        let id = EntityId::generate();

        for attempt in 1..=SLUG_RETRIES {
            let slug = unique_slug(&base, |candidate| self.storage.slug_exists(kind, candidate))?;
            let mut doc = Document::new(id, kind);
            doc.fields = fields.clone();
            doc.set(SLUG_FIELD, slug.as_str());
            self.catalog.validate_document(&doc)?;

            let visibility = VisibilityRecord::defaults_for(def, id);
            let membership =
                creator_id.map(|profile| MemberRecord::new(id, kind, profile, Role::Admin));

            match self.storage.insert_entity(&doc, &visibility, membership.as_ref()) {
                Ok(()) => {
                    info!(kind = %kind, id = %id, slug = %slug, "created entity");
                    return Ok(doc);
                }
                Err(Error::SlugTaken { .. }) if attempt < SLUG_RETRIES => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::SlugExhausted(base))
    }

    /// Update fields of an entity. Admins and profile owners only.
    ///
    /// `Null` clears optional fields. Moving an event under a new parent is
    /// checked for cycles.
    pub fn update_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        fields: BTreeMap<String, Value>,
        actor: &Viewer,
    ) -> Result<Document> {
        self.require_admin(actor, kind, id, "update")?;
        if fields.contains_key(SLUG_FIELD) {
            return Err(Error::ReadOnlyField(SLUG_FIELD.to_string()));
        }
        self.catalog.validate_fields(kind, &fields)?;

        let mut doc = self.storage.fetch(kind, id)?;
        doc.fields.extend(fields);

        if kind == EntityKind::Event {
            if let Some(parent) = parent_of(&doc) {
                EventHierarchy::new(&self.storage).check_parent(id, parent)?;
            }
        }

        self.storage.update_entity(&doc)?;
        info!(kind = %kind, id = %id, "updated entity");
        Ok(doc)
    }

    /// Visibility record of an entity. Admins and profile owners only.
    pub fn visibility(
        &self,
        kind: EntityKind,
        id: EntityId,
        actor: &Viewer,
    ) -> Result<VisibilityRecord> {
        self.require_admin(actor, kind, id, "view visibility of")?;
        self.storage
            .get_visibility(id)?
            .ok_or(Error::MissingVisibility(id))
    }

    /// Change visibility flags of an entity. Admins and profile owners only.
    pub fn update_visibility(
        &self,
        kind: EntityKind,
        id: EntityId,
        update: &VisibilityUpdate,
        actor: &Viewer,
    ) -> Result<VisibilityRecord> {
        self.require_admin(actor, kind, id, "change visibility of")?;
        let def = self.catalog.entity(kind)?;

        let mut record = match self.storage.get_visibility(id)? {
            Some(record) => record,
            None => VisibilityRecord::all_hidden(def, id),
        };
        record.apply(update, def)?;
        self.storage.put_visibility(&record)?;

        info!(kind = %kind, id = %id, fields = update.flags.len(), "updated visibility");
        Ok(record)
    }

    /// Delete an entity with everything hanging off it. Admins and profile
    /// owners only.
    pub fn delete_entity(
        &self,
        kind: EntityKind,
        id: EntityId,
        actor: &Viewer,
    ) -> Result<DeleteResult> {
        self.require_admin(actor, kind, id, "delete")?;
        let result = self.storage.delete_entity(kind, id)?;
        info!(
            kind = %kind,
            id = %id,
            memberships = result.removed_memberships,
            invites = result.removed_invites,
            children = result.detached_children.len(),
            "deleted entity"
        );
        Ok(result)
    }

    /// Invite a profile into a role. Entity admins only.
    pub fn invite(
        &self,
        kind: EntityKind,
        entity: EntityId,
        profile: EntityId,
        role: Role,
        actor: &Viewer,
    ) -> Result<Invite> {
        ensure_has_members(kind)?;
        self.require_admin(actor, kind, entity, "invite into")?;
        self.storage.fetch(EntityKind::Profile, profile)?;

        let invite = Invite::pending(entity, kind, profile, role, Direction::Invite);
        self.storage.put_invite(&invite)?;
        info!(kind = %kind, entity = %entity, profile = %profile, role = %role, "invited profile");
        Ok(invite)
    }

    /// Ask to join an entity in a role. Any signed-in profile.
    pub fn request_membership(
        &self,
        kind: EntityKind,
        entity: EntityId,
        role: Role,
        actor: &Viewer,
    ) -> Result<Invite> {
        ensure_has_members(kind)?;
        let profile = actor.profile_id.ok_or_else(|| {
            SecurityError::PermissionDenied(
                "requesting membership requires a signed-in profile".into(),
            )
        })?;
        self.storage.fetch(kind, entity)?;

        let invite = Invite::pending(entity, kind, profile, role, Direction::Request);
        self.storage.put_invite(&invite)?;
        info!(
            kind = %kind,
            entity = %entity,
            profile = %profile,
            role = %role,
            "requested membership"
        );
        Ok(invite)
    }

    /// Accept an invite (the invitee) or a request (entity admins).
    pub fn accept(&self, invite: EntityId, actor: &Viewer) -> Result<Invite> {
        self.answer(invite, InviteStatus::Accepted, actor)
    }

    /// Reject an invite (the invitee) or a request (entity admins).
    pub fn reject(&self, invite: EntityId, actor: &Viewer) -> Result<Invite> {
        self.answer(invite, InviteStatus::Rejected, actor)
    }

    /// Withdraw an invite (entity admins) or a request (the requester).
    pub fn cancel(&self, invite: EntityId, actor: &Viewer) -> Result<Invite> {
        self.answer(invite, InviteStatus::Canceled, actor)
    }

    /// Invites and requests of an entity. Entity admins only.
    pub fn invites_for_entity(
        &self,
        kind: EntityKind,
        entity: EntityId,
        actor: &Viewer,
    ) -> Result<Vec<Invite>> {
        self.require_admin(actor, kind, entity, "list invites of")?;
        self.storage.invites_for_entity(entity)
    }

    /// Invites and requests naming the signed-in viewer.
    pub fn invites_for_viewer(&self, actor: &Viewer) -> Result<Vec<Invite>> {
        let profile = actor.profile_id.ok_or_else(|| {
            SecurityError::PermissionDenied("listing invites requires a signed-in profile".into())
        })?;
        self.storage.invites_for_profile(profile)
    }

    /// Remove a membership. Entity admins, or the member leaving.
    pub fn remove_member(
        &self,
        kind: EntityKind,
        entity: EntityId,
        profile: EntityId,
        role: Role,
        actor: &Viewer,
    ) -> Result<MemberRecord> {
        ensure_has_members(kind)?;
        if !actor.is(profile) {
            self.require_admin(actor, kind, entity, "remove members of")?;
        } else {
            self.storage.fetch(kind, entity)?;
        }

        let removed = self
            .storage
            .remove_member(entity, profile, role)?
            .ok_or(SecurityError::NotAMember { entity, profile })?;
        info!(kind = %kind, entity = %entity, profile = %profile, role = %role, "removed member");
        Ok(removed)
    }

    fn answer(&self, id: EntityId, to: InviteStatus, actor: &Viewer) -> Result<Invite> {
        let invite = self.storage.get_invite(id)?.ok_or(Error::InviteNotFound(id))?;

        // The side that started the invite may only cancel it; the other
        // side may only accept or reject.
        let started_by_profile = invite.direction == Direction::Request;
        let profile_side = (to == InviteStatus::Canceled) == started_by_profile;

        if profile_side {
            if !actor.is(invite.profile_id) {
                return Err(SecurityError::PermissionDenied(format!(
                    "only the invited profile may {} this {}",
                    verb(to),
                    noun(invite.direction)
                ))
                .into());
            }
        } else {
            let action = format!("{} a {} for", verb(to), noun(invite.direction));
            self.require_admin(actor, invite.entity_kind, invite.entity_id, &action)?;
        }

        let updated = self.storage.transition_invite(id, to)?;
        info!(
            invite = %id,
            entity = %updated.entity_id,
            profile = %updated.profile_id,
            status = %updated.status,
            "answered invite"
        );
        Ok(updated)
    }

    fn require_admin(
        &self,
        actor: &Viewer,
        kind: EntityKind,
        id: EntityId,
        action: &str,
    ) -> Result<()> {
        let mode = self.mode_of(actor, kind, id)?;
        mode.require_admin(&format!("{} {}", action, kind))?;
        Ok(())
    }
}

fn ensure_has_members(kind: EntityKind) -> Result<()> {
    if kind.has_members() {
        Ok(())
    } else {
        Err(SecurityError::PermissionDenied(format!("{} has no members", kind)).into())
    }
}

fn verb(status: InviteStatus) -> &'static str {
    match status {
        InviteStatus::Accepted => "accept",
        InviteStatus::Rejected => "reject",
        InviteStatus::Canceled => "cancel",
        InviteStatus::Pending => "reopen",
    }
}

fn noun(direction: Direction) -> &'static str {
    match direction {
        Direction::Invite => "invite",
        Direction::Request => "request",
    }
}
