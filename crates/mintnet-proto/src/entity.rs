//! Entity kinds and identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;

/// Size of an entity ID in bytes.
pub const ENTITY_ID_SIZE: usize = 16;

/// The four kinds of entities on the platform.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person's profile.
    Profile,
    /// An organization (school, company, association, network).
    Organization,
    /// An event, optionally nested under a parent event.
    Event,
    /// A project run by a team.
    Project,
}

impl EntityKind {
    /// All entity kinds in a stable order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Profile,
        EntityKind::Organization,
        EntityKind::Event,
        EntityKind::Project,
    ];

    /// Singular, lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Profile => "profile",
            EntityKind::Organization => "organization",
            EntityKind::Event => "event",
            EntityKind::Project => "project",
        }
    }

    /// Plural name, used as route segment.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Profile => "profiles",
            EntityKind::Organization => "organizations",
            EntityKind::Event => "events",
            EntityKind::Project => "projects",
        }
    }

    /// Whether entities of this kind have team members and admins.
    ///
    /// Profiles are owned by the person they describe.
    pub fn has_members(&self) -> bool {
        !matches!(self, EntityKind::Profile)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.plural() == s)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// A 16-byte entity identifier.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct EntityId(pub [u8; ENTITY_ID_SIZE]);

impl EntityId {
    /// Generate a new entity ID with UUID v4 bit layout.
    ///
    /// Combines the current time with a process-wide counter so IDs stay
    /// unique even within the same timestamp.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut id = [0u8; ENTITY_ID_SIZE];
        id[..8].copy_from_slice(&now.to_le_bytes());
        id[8..16].copy_from_slice(&counter.to_le_bytes());

        id[6] = (id[6] & 0x0f) | 0x40;
        id[8] = (id[8] & 0x3f) | 0x80;

        Self(id)
    }

    /// Raw bytes of the ID.
    pub fn as_bytes(&self) -> &[u8; ENTITY_ID_SIZE] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 32-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidId(s.to_string()))?;
        let id: [u8; ENTITY_ID_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidId(s.to_string()))?;
        Ok(Self(id))
    }
}

impl From<[u8; ENTITY_ID_SIZE]> for EntityId {
    fn from(bytes: [u8; ENTITY_ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.to_hex())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for EntityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
