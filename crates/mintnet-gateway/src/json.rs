//! JSON request and response types for the HTTP gateway.

use std::collections::BTreeMap;

use mintnet_core::catalog::{FieldType, ScalarType};
use mintnet_core::{
    Catalog, DeleteResult, Invite, Loaded, MemberRecord, MemberView, Role, VisibilityRecord,
};
use mintnet_proto::{Document, EntityId, EntityKind, Value};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Generic success response wrapper.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    /// Success flag.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    /// Create a new success response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Whether the database was recovered after an unclean shutdown.
    pub recovered: bool,
}

/// Role as named in requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleJson {
    /// Team member.
    #[default]
    TeamMember,
    /// Admin.
    Admin,
}

impl From<RoleJson> for Role {
    fn from(role: RoleJson) -> Self {
        match role {
            RoleJson::TeamMember => Role::TeamMember,
            RoleJson::Admin => Role::Admin,
        }
    }
}

impl From<Role> for RoleJson {
    fn from(role: Role) -> Self {
        match role {
            Role::TeamMember => RoleJson::TeamMember,
            Role::Admin => RoleJson::Admin,
        }
    }
}

/// Body of `POST /{kind}`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Display name; seeds the slug.
    pub name: String,
    /// Initial field values.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /{kind}/:slug/invites`.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    /// Invited profile.
    pub profile: EntityId,
    /// Role granted on acceptance.
    #[serde(default)]
    pub role: RoleJson,
}

/// Body of `POST /{kind}/:slug/requests`.
#[derive(Debug, Default, Deserialize)]
pub struct MembershipRequest {
    /// Requested role.
    #[serde(default)]
    pub role: RoleJson,
}

/// Query of `DELETE /{kind}/:slug/members/:profile`.
#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    /// Role to remove.
    #[serde(default)]
    pub role: RoleJson,
}

/// An entity page as served to the viewer.
#[derive(Debug, Serialize)]
pub struct LoadedJson {
    /// Viewer mode towards the entity.
    pub mode: String,
    /// The entity.
    pub entity: serde_json::Value,
    /// Related entities by relation name.
    pub relations: BTreeMap<String, Vec<serde_json::Value>>,
    /// Team members and admins.
    pub members: Vec<MemberJson>,
}

impl From<&Loaded> for LoadedJson {
    fn from(loaded: &Loaded) -> Self {
        Self {
            mode: loaded.mode.name().to_string(),
            entity: document_to_json(&loaded.entity),
            relations: loaded
                .relations
                .iter()
                .map(|(name, docs)| (name.clone(), docs.iter().map(document_to_json).collect()))
                .collect(),
            members: loaded.members.iter().map(MemberJson::from).collect(),
        }
    }
}

/// One membership row.
#[derive(Debug, Serialize)]
pub struct MemberJson {
    /// Held role.
    pub role: RoleJson,
    /// Membership start, microseconds since epoch.
    pub joined_at: u64,
    /// The member's (filtered) profile.
    pub profile: serde_json::Value,
}

impl From<&MemberView> for MemberJson {
    fn from(member: &MemberView) -> Self {
        Self {
            role: member.role.into(),
            joined_at: member.joined_at,
            profile: document_to_json(&member.profile),
        }
    }
}

/// A removed membership.
#[derive(Debug, Serialize)]
pub struct RemovedMemberJson {
    /// Entity the membership was on.
    pub entity_id: EntityId,
    /// Former member.
    pub profile_id: EntityId,
    /// Removed role.
    pub role: RoleJson,
}

impl From<&MemberRecord> for RemovedMemberJson {
    fn from(member: &MemberRecord) -> Self {
        Self {
            entity_id: member.entity_id,
            profile_id: member.profile_id,
            role: member.role.into(),
        }
    }
}

/// Visibility flags of an entity.
#[derive(Debug, Serialize)]
pub struct VisibilityJson {
    /// The entity.
    pub entity_id: EntityId,
    /// Its kind.
    pub kind: EntityKind,
    /// Flag per gated field.
    pub flags: BTreeMap<String, bool>,
}

impl From<&VisibilityRecord> for VisibilityJson {
    fn from(record: &VisibilityRecord) -> Self {
        Self {
            entity_id: record.entity_id,
            kind: record.kind,
            flags: record.flags.clone(),
        }
    }
}

/// An invite or join request.
#[derive(Debug, Serialize)]
pub struct InviteJson {
    /// Invite ID.
    pub id: EntityId,
    /// Target entity.
    pub entity_id: EntityId,
    /// Target kind.
    pub entity_kind: EntityKind,
    /// Invited or requesting profile.
    pub profile_id: EntityId,
    /// Role granted on acceptance.
    pub role: RoleJson,
    /// `invite` or `request`.
    pub direction: String,
    /// Current status.
    pub status: String,
    /// Creation time, microseconds since epoch.
    pub created_at: u64,
    /// Time of the last status change.
    pub updated_at: u64,
}

impl From<&Invite> for InviteJson {
    fn from(invite: &Invite) -> Self {
        Self {
            id: invite.id,
            entity_id: invite.entity_id,
            entity_kind: invite.entity_kind,
            profile_id: invite.profile_id,
            role: invite.role.into(),
            direction: match invite.direction {
                mintnet_core::Direction::Invite => "invite".to_string(),
                mintnet_core::Direction::Request => "request".to_string(),
            },
            status: invite.status.name().to_string(),
            created_at: invite.created_at,
            updated_at: invite.updated_at,
        }
    }
}

/// Outcome of a delete.
#[derive(Debug, Serialize)]
pub struct DeletedJson {
    /// Deleted entity.
    pub id: EntityId,
    /// Removed membership rows.
    pub removed_memberships: usize,
    /// Removed invites and requests.
    pub removed_invites: usize,
    /// Child events that lost their parent.
    pub detached_children: Vec<EntityId>,
}

impl From<&DeleteResult> for DeletedJson {
    fn from(result: &DeleteResult) -> Self {
        Self {
            id: result.document.id,
            removed_memberships: result.removed_memberships,
            removed_invites: result.removed_invites,
            detached_children: result.detached_children.clone(),
        }
    }
}

// Conversion functions

/// Convert Value to JSON value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int64(i) => serde_json::json!(i),
        Value::Float64(f) => serde_json::json!(f),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Timestamp(t) => serde_json::json!(t),
        Value::Uuid(u) => serde_json::Value::String(EntityId(*u).to_hex()),
        Value::StringArray(arr) => serde_json::json!(arr),
    }
}

/// Convert a document to a JSON object with `id` and `kind` next to its fields.
pub fn document_to_json(doc: &Document) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("id".to_string(), serde_json::Value::String(doc.id.to_hex()));
    obj.insert("kind".to_string(), serde_json::Value::String(doc.kind.name().to_string()));
    for (name, value) in &doc.fields {
        obj.insert(name.clone(), value_to_json(value));
    }
    serde_json::Value::Object(obj)
}

/// Convert a JSON value to a Value of the declared field type.
pub fn json_to_value(field_type: &FieldType, json: &serde_json::Value) -> Result<Value, String> {
    use serde_json::Value as Json;

    if json.is_null() {
        return if field_type.is_nullable() {
            Ok(Value::Null)
        } else {
            Err("null is not allowed".to_string())
        };
    }

    if field_type.is_array() {
        let items = json.as_array().ok_or("expected an array")?;
        return items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| "expected strings".to_string())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::StringArray);
    }

    match (field_type.scalar_type(), json) {
        (ScalarType::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ScalarType::Int64, Json::Number(n)) => n
            .as_i64()
            .map(Value::Int64)
            .ok_or_else(|| "expected an integer".into()),
        (ScalarType::Float64, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| "expected a number".into()),
        (ScalarType::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (ScalarType::Timestamp, Json::Number(n)) => n
            .as_i64()
            .map(Value::Timestamp)
            .ok_or_else(|| "expected microseconds since epoch".into()),
        (ScalarType::Uuid, Json::String(s)) => EntityId::from_hex(s)
            .map(|id| Value::Uuid(*id.as_bytes()))
            .map_err(|e| e.to_string()),
        (scalar, _) => Err(format!("expected {}", scalar.name())),
    }
}

/// Convert a JSON object of field values, typed by the catalog.
pub fn parse_fields(
    catalog: &Catalog,
    kind: EntityKind,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> Result<BTreeMap<String, Value>, AppError> {
    let def = catalog.entity(kind)?;
    fields
        .iter()
        .map(|(name, json)| {
            let field = def
                .get_field(name)
                .ok_or_else(|| AppError::bad_request(format!("unknown field {}.{}", kind, name)))?;
            let value = json_to_value(&field.field_type, json)
                .map_err(|e| AppError::bad_request(format!("{}.{}: {}", kind, name, e)))?;
            Ok((name.clone(), value))
        })
        .collect()
}
