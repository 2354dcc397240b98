//! Storage engine implementation.

use mintnet_proto::{Document, EntityId, EntityKind, Value, ENTITY_ID_SIZE};
use sled::transaction::{abort, ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, Transactional, Tree};
use tracing::debug;

use super::key::{self, MEMBER_KEY_SIZE};
use super::{Record, StorageConfig};
use crate::error::{Error, Result};
use crate::membership::{Invite, InviteStatus, MemberRecord, Role};
use crate::security::{RoleLookup, SecurityError};
use crate::visibility::VisibilityRecord;

/// Tree name for entity documents.
const ENTITIES_TREE: &str = "entities";

/// Tree name for visibility records.
const VISIBILITY_TREE: &str = "visibility";

/// Tree name for the slug index.
const SLUGS_TREE: &str = "index:slug";

/// Tree name for the entity kind index.
const TYPE_INDEX_TREE: &str = "index:entity_kind";

/// Tree name for memberships keyed by entity.
const MEMBERS_TREE: &str = "members";

/// Tree name for memberships keyed by profile.
const MEMBER_INDEX_TREE: &str = "index:member_profile";

/// Tree name for per-entity admin counters.
const ADMINS_TREE: &str = "admins";

/// Tree name for invites and join requests.
const INVITES_TREE: &str = "invites";

/// Tree name for the pending invite index (membership key -> invite id).
const PENDING_TREE: &str = "index:pending_invite";

/// Value of index entries that carry no payload.
const EMPTY: &[u8] = &[];

type TxResult<T> = std::result::Result<T, ConflictableTransactionError<Error>>;

/// Outcome of a cascading delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResult {
    /// The removed document.
    pub document: Document,
    /// Number of membership rows removed.
    pub removed_memberships: usize,
    /// Number of invites and requests removed.
    pub removed_invites: usize,
    /// Child events whose parent reference was cleared.
    pub detached_children: Vec<EntityId>,
}

/// The main storage engine wrapping sled.
pub struct StorageEngine {
    db: Db,
    entities: Tree,
    visibility: Tree,
    slugs: Tree,
    type_index: Tree,
    members: Tree,
    member_index: Tree,
    admins: Tree,
    invites: Tree,
    pending: Tree,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let db = config.to_sled_config().open()?;

        Ok(Self {
            entities: db.open_tree(ENTITIES_TREE)?,
            visibility: db.open_tree(VISIBILITY_TREE)?,
            slugs: db.open_tree(SLUGS_TREE)?,
            type_index: db.open_tree(TYPE_INDEX_TREE)?,
            members: db.open_tree(MEMBERS_TREE)?,
            member_index: db.open_tree(MEMBER_INDEX_TREE)?,
            admins: db.open_tree(ADMINS_TREE)?,
            invites: db.open_tree(INVITES_TREE)?,
            pending: db.open_tree(PENDING_TREE)?,
            db,
        })
    }

    /// Check if the database was recovered from a previous crash.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    // ========== Entities ==========

    /// Insert a new entity together with its visibility record.
    ///
    /// Entity, visibility, slug and kind index are written in one
    /// transaction, along with the creator's admin membership if given.
    pub fn insert_entity(
        &self,
        doc: &Document,
        visibility: &VisibilityRecord,
        creator: Option<&MemberRecord>,
    ) -> Result<()> {
        if visibility.entity_id != doc.id {
            return Err(SecurityError::VisibilityMismatch {
                entity: doc.id,
                record: visibility.entity_id,
            }
            .into());
        }
        let slug = doc.slug().ok_or_else(|| Error::MissingField {
            kind: doc.kind,
            field: "slug".to_string(),
        })?;

        let id = doc.id;
        let kind = doc.kind;
        let record_bytes = Record::new(doc.to_bytes()?).to_bytes()?;
        let visibility_bytes = visibility.to_bytes()?;
        let slug_key = key::slug_key(kind, slug);
        let type_key = key::type_index_key(kind, id);
        let membership = creator
            .map(|m| -> Result<_> {
                Ok((
                    key::member_key(m.entity_id, m.profile_id, m.role),
                    key::member_index_key(m.profile_id, m.entity_id, m.role),
                    m.role,
                    m.to_bytes()?,
                ))
            })
            .transpose()?;

        let result = (
            &self.entities,
            &self.visibility,
            &self.slugs,
            &self.type_index,
            &self.members,
            &self.member_index,
            &self.admins,
        )
            .transaction(|(entities, vis, slugs, types, members, member_index, admins)| {
                if slugs.get(&slug_key[..])?.is_some() {
                    return abort(Error::SlugTaken {
                        kind,
                        slug: slug.to_string(),
                    });
                }
                if entities.get(&id.as_bytes()[..])?.is_some() {
                    return abort(Error::Transaction(format!("{} {} already exists", kind, id)));
                }

                entities.insert(&id.as_bytes()[..], record_bytes.as_slice())?;
                vis.insert(&id.as_bytes()[..], visibility_bytes.as_slice())?;
                slugs.insert(&slug_key[..], &id.as_bytes()[..])?;
                types.insert(&type_key[..], EMPTY)?;

                if let Some((member_key, index_key, role, bytes)) = &membership {
                    members.insert(&member_key[..], bytes.as_slice())?;
                    member_index.insert(&index_key[..], EMPTY)?;
                    if *role == Role::Admin {
                        adjust_admins(admins, &id, 1)?;
                    }
                }
                Ok(())
            });

        finish(result)?;
        debug!(kind = %kind, id = %id, slug, "inserted entity");
        Ok(())
    }

    /// Replace the fields of an existing entity.
    ///
    /// The slug is fixed at creation; changing it fails with
    /// [`Error::ReadOnlyField`]. The existence check and the write run in one
    /// transaction, so an entity deleted concurrently stays deleted.
    pub fn update_entity(&self, doc: &Document) -> Result<()> {
        let id = doc.id;
        let kind = doc.kind;
        let doc_bytes = doc.to_bytes()?;

        let result = self.entities.transaction(|entities| {
            let (existing, record) = match entities.get(&id.as_bytes()[..])? {
                Some(bytes) => decode_record(&bytes).map_err(ConflictableTransactionError::Abort)?,
                None => return abort(Error::not_found(kind, id)),
            };
            if existing.kind != kind {
                return abort(Error::not_found(kind, id));
            }
            if existing.slug() != doc.slug() {
                return abort(Error::ReadOnlyField("slug".to_string()));
            }

            let bytes = record
                .updated(doc_bytes.clone())
                .to_bytes()
                .map_err(ConflictableTransactionError::Abort)?;
            entities.insert(&id.as_bytes()[..], bytes)?;
            Ok(())
        });
        finish(result)
    }

    /// Get an entity document by ID.
    pub fn get_entity(&self, id: EntityId) -> Result<Option<Document>> {
        Ok(self.get_record(id)?.map(|(doc, _)| doc))
    }

    /// Get an entity document along with its record metadata.
    pub fn get_record(&self, id: EntityId) -> Result<Option<(Document, Record)>> {
        self.entities
            .get(id.as_bytes())?
            .map(|bytes| decode_record(&bytes))
            .transpose()
    }

    /// Get an entity of a specific kind, failing if it does not exist.
    pub fn fetch(&self, kind: EntityKind, id: EntityId) -> Result<Document> {
        self.get_entity(id)?
            .filter(|doc| doc.kind == kind)
            .ok_or_else(|| Error::not_found(kind, id))
    }

    /// Get the visibility record of an entity.
    pub fn get_visibility(&self, id: EntityId) -> Result<Option<VisibilityRecord>> {
        self.visibility
            .get(id.as_bytes())?
            .map(|bytes| VisibilityRecord::from_bytes(&bytes))
            .transpose()
    }

    /// Replace the visibility record of an existing entity.
    ///
    /// Fails with [`Error::NotFound`] if the entity is gone by the time the
    /// record would be written.
    pub fn put_visibility(&self, visibility: &VisibilityRecord) -> Result<()> {
        let id = visibility.entity_id;
        let kind = visibility.kind;
        let bytes = visibility.to_bytes()?;

        let result = (&self.entities, &self.visibility).transaction(|(entities, vis)| {
            let exists = match entities.get(&id.as_bytes()[..])? {
                Some(entity) => {
                    let (doc, _) =
                        decode_record(&entity).map_err(ConflictableTransactionError::Abort)?;
                    doc.kind == kind
                }
                None => false,
            };
            if !exists {
                return abort(Error::not_found(kind, id));
            }
            vis.insert(&id.as_bytes()[..], bytes.as_slice())?;
            Ok(())
        });
        finish(result)
    }

    /// Resolve a slug to an entity ID.
    pub fn resolve_slug(&self, kind: EntityKind, slug: &str) -> Result<Option<EntityId>> {
        match self.slugs.get(key::slug_key(kind, slug))? {
            Some(bytes) => key::decode_id(&bytes)
                .map(Some)
                .ok_or_else(|| {
                    Error::Deserialization(format!("invalid slug index entry for {}", slug))
                }),
            None => Ok(None),
        }
    }

    /// Check whether a slug is taken within a kind.
    pub fn slug_exists(&self, kind: EntityKind, slug: &str) -> Result<bool> {
        Ok(self.slugs.contains_key(key::slug_key(kind, slug))?)
    }

    /// Scan all entities of a kind, in ID order.
    pub fn scan_kind(&self, kind: EntityKind) -> impl Iterator<Item = Result<Document>> + '_ {
        self.type_index
            .scan_prefix([key::kind_tag(kind)])
            .filter_map(move |result| match result {
                Ok((k, _)) => {
                    let Some(id) = key::decode_id(&k[1..]) else {
                        return Some(Err(Error::Deserialization("invalid kind index key".into())));
                    };
                    self.get_entity(id).transpose()
                }
                Err(e) => Some(Err(e.into())),
            })
    }

    /// Events whose `parent_event_id` points at `parent`.
    pub fn event_children(&self, parent: EntityId) -> Result<Vec<Document>> {
        let mut children = Vec::new();
        for doc in self.scan_kind(EntityKind::Event) {
            let doc = doc?;
            if parent_of(&doc) == Some(parent) {
                children.push(doc);
            }
        }
        Ok(children)
    }

    /// Delete an entity and everything hanging off it.
    ///
    /// Removes the entity, its visibility record, slug and kind index entry,
    /// every membership in either direction and every invite naming it.
    /// Child events are kept with their parent reference cleared. Deleting a
    /// profile that is the last admin of some entity fails with
    /// [`Error::LastAdmin`].
    pub fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<DeleteResult> {
        let current = self.fetch(kind, id)?;
        let slug_key = current.slug().map(|s| key::slug_key(kind, s));
        let type_key = key::type_index_key(kind, id);

        // (member key, reverse key, entity holding the role, role)
        let memberships: Vec<([u8; MEMBER_KEY_SIZE], [u8; MEMBER_KEY_SIZE], EntityId, Role)> =
            if kind == EntityKind::Profile {
                self.memberships_of(id)?
                    .into_iter()
                    .map(|m| {
                        (
                            key::member_key(m.entity_id, id, m.role),
                            key::member_index_key(id, m.entity_id, m.role),
                            m.entity_id,
                            m.role,
                        )
                    })
                    .collect()
            } else {
                self.members_of(id)?
                    .into_iter()
                    .map(|m| {
                        (
                            key::member_key(id, m.profile_id, m.role),
                            key::member_index_key(m.profile_id, id, m.role),
                            id,
                            m.role,
                        )
                    })
                    .collect()
            };

        let invites: Vec<([u8; ENTITY_ID_SIZE], Option<[u8; MEMBER_KEY_SIZE]>)> = self
            .scan_invites(|inv| inv.entity_id == id || inv.profile_id == id)?
            .into_iter()
            .map(|inv| {
                let pending = (inv.status == InviteStatus::Pending)
                    .then(|| key::member_key(inv.entity_id, inv.profile_id, inv.role));
                (*inv.id.as_bytes(), pending)
            })
            .collect();

        // Candidates only; each child is re-read inside the transaction
        let candidates: Vec<EntityId> = if kind == EntityKind::Event {
            self.event_children(id)?.into_iter().map(|child| child.id).collect()
        } else {
            Vec::new()
        };

        let result = (
            &self.entities,
            &self.visibility,
            &self.slugs,
            &self.type_index,
            &self.members,
            &self.member_index,
            &self.admins,
            &self.invites,
            &self.pending,
        )
            .transaction(
                |(entities, vis, slugs, types, members, member_index, admins, invites_tx, pending)| {
                    let Some(removed) = entities.remove(&id.as_bytes()[..])? else {
                        return abort(Error::not_found(kind, id));
                    };
                    let (document, _) =
                        decode_record(&removed).map_err(ConflictableTransactionError::Abort)?;
                    if document.kind != kind {
                        return abort(Error::not_found(kind, id));
                    }
                    vis.remove(&id.as_bytes()[..])?;
                    if let Some(slug_key) = &slug_key {
                        slugs.remove(&slug_key[..])?;
                    }
                    types.remove(&type_key[..])?;

                    for (member_key, index_key, entity, role) in &memberships {
                        members.remove(&member_key[..])?;
                        member_index.remove(&index_key[..])?;
                        if kind == EntityKind::Profile && *role == Role::Admin {
                            if admin_count(admins, entity)? <= 1 {
                                return abort(Error::LastAdmin(*entity));
                            }
                            adjust_admins(admins, entity, -1)?;
                        }
                    }
                    if kind != EntityKind::Profile {
                        admins.remove(&id.as_bytes()[..])?;
                    }

                    for (invite_id, pending_key) in &invites {
                        invites_tx.remove(&invite_id[..])?;
                        if let Some(pending_key) = pending_key {
                            pending.remove(&pending_key[..])?;
                        }
                    }

                    let mut detached = Vec::new();
                    for child_id in &candidates {
                        let Some(bytes) = entities.get(&child_id.as_bytes()[..])? else {
                            continue;
                        };
                        let (mut child, record) =
                            decode_record(&bytes).map_err(ConflictableTransactionError::Abort)?;
                        if parent_of(&child) != Some(id) {
                            continue;
                        }
                        child.set("parent_event_id", Value::Null);
                        let data = child
                            .to_bytes()
                            .map_err(|e| ConflictableTransactionError::Abort(Error::from(e)))?;
                        let updated = record
                            .updated(data)
                            .to_bytes()
                            .map_err(ConflictableTransactionError::Abort)?;
                        entities.insert(&child_id.as_bytes()[..], updated)?;
                        detached.push(*child_id);
                    }
                    Ok((document, detached))
                },
            );
        let (document, detached_children) = finish(result)?;

        debug!(
            kind = %kind,
            id = %id,
            memberships = memberships.len(),
            invites = invites.len(),
            children = detached_children.len(),
            "deleted entity"
        );

        Ok(DeleteResult {
            document,
            removed_memberships: memberships.len(),
            removed_invites: invites.len(),
            detached_children,
        })
    }

    // ========== Memberships ==========

    /// Add a membership row. Fails with [`Error::AlreadyMember`] if the
    /// profile already holds that role.
    pub fn put_member(&self, member: &MemberRecord) -> Result<()> {
        let member_key = key::member_key(member.entity_id, member.profile_id, member.role);
        let index_key = key::member_index_key(member.profile_id, member.entity_id, member.role);
        let bytes = member.to_bytes()?;

        let result = (&self.members, &self.member_index, &self.admins).transaction(
            |(members, member_index, admins)| {
                insert_member(
                    members,
                    member_index,
                    admins,
                    member,
                    &member_key,
                    &index_key,
                    &bytes,
                )
            },
        );
        finish(result)
    }

    /// Remove a membership row.
    ///
    /// Returns the removed row, or `None` if the profile did not hold the
    /// role. Removing the last admin fails with [`Error::LastAdmin`].
    pub fn remove_member(
        &self,
        entity: EntityId,
        profile: EntityId,
        role: Role,
    ) -> Result<Option<MemberRecord>> {
        let member_key = key::member_key(entity, profile, role);
        let index_key = key::member_index_key(profile, entity, role);

        let result = (&self.members, &self.member_index, &self.admins).transaction(
            |(members, member_index, admins)| {
                let Some(bytes) = members.get(&member_key[..])? else {
                    return Ok(None);
                };
                if role == Role::Admin {
                    if admin_count(admins, &entity)? <= 1 {
                        return abort(Error::LastAdmin(entity));
                    }
                    adjust_admins(admins, &entity, -1)?;
                }
                members.remove(&member_key[..])?;
                member_index.remove(&index_key[..])?;
                MemberRecord::from_bytes(&bytes)
                    .map(Some)
                    .map_err(ConflictableTransactionError::Abort)
            },
        );
        finish(result)
    }

    /// Membership rows of an entity, oldest first.
    pub fn members_of(&self, entity: EntityId) -> Result<Vec<MemberRecord>> {
        let mut rows = self
            .members
            .scan_prefix(entity.as_bytes())
            .map(|result| {
                let (_, bytes) = result?;
                MemberRecord::from_bytes(&bytes)
            })
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by_key(|m| (m.joined_at, m.profile_id));
        Ok(rows)
    }

    /// Membership rows held by a profile, oldest first.
    pub fn memberships_of(&self, profile: EntityId) -> Result<Vec<MemberRecord>> {
        let mut rows = Vec::new();
        for result in self.member_index.scan_prefix(profile.as_bytes()) {
            let (k, _) = result?;
            let (_, entity, role) = key::decode_pair_key(&k)
                .ok_or_else(|| Error::Deserialization("invalid member index key".into()))?;
            if let Some(bytes) = self.members.get(key::member_key(entity, profile, role))? {
                rows.push(MemberRecord::from_bytes(&bytes)?);
            }
        }
        rows.sort_by_key(|m| (m.joined_at, m.entity_id));
        Ok(rows)
    }

    /// Number of admins of an entity.
    pub fn admin_count(&self, entity: EntityId) -> Result<u64> {
        Ok(self
            .admins
            .get(entity.as_bytes())?
            .map(|bytes| decode_count(&bytes))
            .unwrap_or(0))
    }

    // ========== Invites ==========

    /// Store a new pending invite or request.
    ///
    /// Fails with [`Error::DuplicateInvite`] if a pending one for the same
    /// membership exists, and with [`Error::AlreadyMember`] if the profile
    /// already holds the role.
    pub fn put_invite(&self, invite: &Invite) -> Result<()> {
        let member_key = key::member_key(invite.entity_id, invite.profile_id, invite.role);
        let bytes = invite.to_bytes()?;

        let result = (&self.invites, &self.pending, &self.members).transaction(
            |(invites, pending, members)| {
                if members.get(&member_key[..])?.is_some() {
                    return abort(Error::AlreadyMember {
                        entity: invite.entity_id,
                        profile: invite.profile_id,
                    });
                }
                if pending.get(&member_key[..])?.is_some() {
                    return abort(Error::DuplicateInvite {
                        entity: invite.entity_id,
                        profile: invite.profile_id,
                    });
                }
                invites.insert(&invite.id.as_bytes()[..], bytes.as_slice())?;
                pending.insert(&member_key[..], &invite.id.as_bytes()[..])?;
                Ok(())
            },
        );
        finish(result)
    }

    /// Get an invite by ID.
    pub fn get_invite(&self, id: EntityId) -> Result<Option<Invite>> {
        self.invites
            .get(id.as_bytes())?
            .map(|bytes| Invite::from_bytes(&bytes))
            .transpose()
    }

    /// Move a pending invite to `to`.
    ///
    /// Accepting creates the membership in the same transaction. Returns the
    /// updated invite.
    pub fn transition_invite(&self, id: EntityId, to: InviteStatus) -> Result<Invite> {
        let result = (
            &self.invites,
            &self.pending,
            &self.members,
            &self.member_index,
            &self.admins,
        )
            .transaction(|(invites, pending, members, member_index, admins)| {
                let Some(bytes) = invites.get(&id.as_bytes()[..])? else {
                    return abort(Error::InviteNotFound(id));
                };
                let mut invite =
                    Invite::from_bytes(&bytes).map_err(ConflictableTransactionError::Abort)?;
                invite
                    .transition(to)
                    .map_err(|e| ConflictableTransactionError::Abort(Error::from(e)))?;

                let member_key = key::member_key(invite.entity_id, invite.profile_id, invite.role);
                pending.remove(&member_key[..])?;

                if to == InviteStatus::Accepted {
                    let member = MemberRecord::new(
                        invite.entity_id,
                        invite.entity_kind,
                        invite.profile_id,
                        invite.role,
                    );
                    let member_bytes =
                        member.to_bytes().map_err(ConflictableTransactionError::Abort)?;
                    let index_key =
                        key::member_index_key(invite.profile_id, invite.entity_id, invite.role);
                    insert_member(
                        members,
                        member_index,
                        admins,
                        &member,
                        &member_key,
                        &index_key,
                        &member_bytes,
                    )?;
                }

                let updated = invite.to_bytes().map_err(ConflictableTransactionError::Abort)?;
                invites.insert(&id.as_bytes()[..], updated)?;
                Ok(invite)
            });
        finish(result)
    }

    /// Invites and requests targeting an entity, oldest first.
    pub fn invites_for_entity(&self, entity: EntityId) -> Result<Vec<Invite>> {
        self.scan_invites(|inv| inv.entity_id == entity)
    }

    /// Invites and requests naming a profile, oldest first.
    pub fn invites_for_profile(&self, profile: EntityId) -> Result<Vec<Invite>> {
        self.scan_invites(|inv| inv.profile_id == profile)
    }

    fn scan_invites(&self, keep: impl Fn(&Invite) -> bool) -> Result<Vec<Invite>> {
        let mut invites = Vec::new();
        for result in self.invites.iter() {
            let (_, bytes) = result?;
            let invite = Invite::from_bytes(&bytes)?;
            if keep(&invite) {
                invites.push(invite);
            }
        }
        invites.sort_by_key(|inv| (inv.created_at, inv.id));
        Ok(invites)
    }
}

impl RoleLookup for StorageEngine {
    fn role_of(&self, entity: EntityId, profile: EntityId) -> Result<Option<Role>> {
        let mut prefix = [0u8; ENTITY_ID_SIZE * 2];
        prefix[..ENTITY_ID_SIZE].copy_from_slice(entity.as_bytes());
        prefix[ENTITY_ID_SIZE..].copy_from_slice(profile.as_bytes());

        let mut best = None;
        for result in self.members.scan_prefix(prefix) {
            let (k, _) = result?;
            if let Some((_, _, role)) = key::decode_pair_key(&k) {
                best = best.max(Some(role));
            }
        }
        Ok(best)
    }
}

/// Parent event ID of an event document.
pub fn parent_of(doc: &Document) -> Option<EntityId> {
    doc.get("parent_event_id")
        .and_then(Value::as_uuid)
        .map(|bytes| EntityId(*bytes))
}

fn decode_record(bytes: &[u8]) -> Result<(Document, Record)> {
    let record = Record::from_bytes(bytes)?;
    let doc = Document::from_bytes(&record.data)?;
    Ok((doc, record))
}

fn finish<T>(result: std::result::Result<T, TransactionError<Error>>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
    }
}

fn insert_member(
    members: &TransactionalTree,
    member_index: &TransactionalTree,
    admins: &TransactionalTree,
    member: &MemberRecord,
    member_key: &[u8],
    index_key: &[u8],
    bytes: &[u8],
) -> TxResult<()> {
    if members.get(member_key)?.is_some() {
        return abort(Error::AlreadyMember {
            entity: member.entity_id,
            profile: member.profile_id,
        });
    }
    members.insert(member_key, bytes)?;
    member_index.insert(index_key, EMPTY)?;
    if member.role == Role::Admin {
        adjust_admins(admins, &member.entity_id, 1)?;
    }
    Ok(())
}

fn decode_count(bytes: &[u8]) -> u64 {
    bytes
        .try_into()
        .map(u64::from_be_bytes)
        .unwrap_or(0)
}

fn admin_count(admins: &TransactionalTree, entity: &EntityId) -> TxResult<u64> {
    Ok(admins
        .get(&entity.as_bytes()[..])?
        .map(|bytes| decode_count(&bytes))
        .unwrap_or(0))
}

fn adjust_admins(admins: &TransactionalTree, entity: &EntityId, delta: i64) -> TxResult<()> {
    let count = admin_count(admins, entity)?.saturating_add_signed(delta);
    if count == 0 {
        admins.remove(&entity.as_bytes()[..])?;
    } else {
        admins.insert(&entity.as_bytes()[..], &count.to_be_bytes()[..])?;
    }
    Ok(())
}
