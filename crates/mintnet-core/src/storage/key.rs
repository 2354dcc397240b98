//! Key encodings for the storage trees.
//!
//! Composite keys are fixed-width byte concatenations so that prefix scans
//! over the leading component return all rows for it:
//!
//! - type index: `[kind tag (1)][entity_id (16)]`
//! - slugs: `[kind tag (1)][slug bytes]`
//! - members: `[entity_id (16)][profile_id (16)][role tag (1)]`
//! - member index: `[profile_id (16)][entity_id (16)][role tag (1)]`

use mintnet_proto::{EntityId, EntityKind, ENTITY_ID_SIZE};

use crate::membership::Role;

/// Size of a membership key.
pub const MEMBER_KEY_SIZE: usize = ENTITY_ID_SIZE * 2 + 1;

/// One-byte tag of an entity kind.
pub fn kind_tag(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::Profile => 0,
        EntityKind::Organization => 1,
        EntityKind::Event => 2,
        EntityKind::Project => 3,
    }
}

/// One-byte tag of a role.
pub fn role_tag(role: Role) -> u8 {
    match role {
        Role::TeamMember => 0,
        Role::Admin => 1,
    }
}

/// Decode a role tag.
pub fn role_from_tag(tag: u8) -> Option<Role> {
    match tag {
        0 => Some(Role::TeamMember),
        1 => Some(Role::Admin),
        _ => None,
    }
}

/// Type index key.
pub fn type_index_key(kind: EntityKind, id: EntityId) -> [u8; ENTITY_ID_SIZE + 1] {
    let mut key = [0u8; ENTITY_ID_SIZE + 1];
    key[0] = kind_tag(kind);
    key[1..].copy_from_slice(id.as_bytes());
    key
}

/// Slug index key.
pub fn slug_key(kind: EntityKind, slug: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(slug.len() + 1);
    key.push(kind_tag(kind));
    key.extend_from_slice(slug.as_bytes());
    key
}

/// Membership key, ordered by entity first.
pub fn member_key(entity: EntityId, profile: EntityId, role: Role) -> [u8; MEMBER_KEY_SIZE] {
    pair_key(entity, profile, role)
}

/// Reverse membership key, ordered by profile first.
pub fn member_index_key(profile: EntityId, entity: EntityId, role: Role) -> [u8; MEMBER_KEY_SIZE] {
    pair_key(profile, entity, role)
}

fn pair_key(first: EntityId, second: EntityId, role: Role) -> [u8; MEMBER_KEY_SIZE] {
    let mut key = [0u8; MEMBER_KEY_SIZE];
    key[..ENTITY_ID_SIZE].copy_from_slice(first.as_bytes());
    key[ENTITY_ID_SIZE..ENTITY_ID_SIZE * 2].copy_from_slice(second.as_bytes());
    key[ENTITY_ID_SIZE * 2] = role_tag(role);
    key
}

/// Split a membership or reverse membership key into its parts.
pub fn decode_pair_key(bytes: &[u8]) -> Option<(EntityId, EntityId, Role)> {
    if bytes.len() != MEMBER_KEY_SIZE {
        return None;
    }
    let first = decode_id(&bytes[..ENTITY_ID_SIZE])?;
    let second = decode_id(&bytes[ENTITY_ID_SIZE..ENTITY_ID_SIZE * 2])?;
    let role = role_from_tag(bytes[ENTITY_ID_SIZE * 2])?;
    Some((first, second, role))
}

/// Decode a 16-byte entity ID.
pub fn decode_id(bytes: &[u8]) -> Option<EntityId> {
    let id: [u8; ENTITY_ID_SIZE] = bytes.try_into().ok()?;
    Some(EntityId(id))
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or_default()
}
