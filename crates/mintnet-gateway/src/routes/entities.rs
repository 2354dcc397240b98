//! Entity pages, edits, visibility settings and memberships.
//!
//! The same handlers serve every entity kind; the kind comes from the
//! router the handlers are nested under.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use mintnet_core::VisibilityUpdate;
use mintnet_proto::{EntityId, EntityKind};

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery, CurrentViewer};
use crate::json::{
    document_to_json, parse_fields, CreateRequest, DeletedJson, InviteJson, InviteRequest,
    LoadedJson, MembershipRequest, RemovedMemberJson, RoleQuery, SuccessResponse, VisibilityJson,
};
use crate::AppState;

type Reply<T> = Result<Json<SuccessResponse<T>>, AppError>;

/// Routes for one entity kind, to be nested under its plural name.
pub fn routes(kind: EntityKind) -> Router<AppState> {
    let router = Router::new()
        .route("/", post(create_entity))
        .route("/:slug", get(load_entity).patch(update_entity).delete(delete_entity))
        .route("/:slug/visibility", get(get_visibility).put(update_visibility))
        .route("/:slug/invites", post(invite).get(list_invites))
        .route("/:slug/requests", post(request_membership))
        .route("/:slug/members/:profile", delete(remove_member));

    let router = if kind == EntityKind::Event {
        router
            .route("/:slug/root", get(event_root))
            .route("/:slug/children", get(event_children))
    } else {
        router
    };

    router.layer(Extension(kind))
}

fn resolve(state: &AppState, kind: EntityKind, slug: &str) -> Result<EntityId, AppError> {
    Ok(state.platform.resolve(kind, slug)?)
}

/// Create an entity owned by the viewer.
async fn create_entity(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppJson(request): AppJson<CreateRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<serde_json::Value>>), AppError> {
    let fields = parse_fields(state.platform.catalog(), kind, &request.fields)?;
    let doc = state
        .platform
        .create_entity(kind, &request.name, fields, &viewer)?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(document_to_json(&doc))),
    ))
}

/// Serve an entity page filtered for the viewer.
async fn load_entity(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<LoadedJson> {
    let loaded = state.platform.loader().load(kind, &slug, &viewer)?;
    Ok(Json(SuccessResponse::new(LoadedJson::from(&loaded))))
}

async fn update_entity(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
    AppJson(body): AppJson<serde_json::Map<String, serde_json::Value>>,
) -> Reply<serde_json::Value> {
    let id = resolve(&state, kind, &slug)?;
    let fields = parse_fields(state.platform.catalog(), kind, &body)?;
    let doc = state.platform.update_entity(kind, id, fields, &viewer)?;
    Ok(Json(SuccessResponse::new(document_to_json(&doc))))
}

async fn delete_entity(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<DeletedJson> {
    let id = resolve(&state, kind, &slug)?;
    let result = state.platform.delete_entity(kind, id, &viewer)?;
    Ok(Json(SuccessResponse::new(DeletedJson::from(&result))))
}

async fn get_visibility(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<VisibilityJson> {
    let id = resolve(&state, kind, &slug)?;
    let record = state.platform.visibility(kind, id, &viewer)?;
    Ok(Json(SuccessResponse::new(VisibilityJson::from(&record))))
}

/// Change visibility flags. The body maps field names to `true` (shown) or `false`.
async fn update_visibility(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
    AppJson(flags): AppJson<BTreeMap<String, bool>>,
) -> Reply<VisibilityJson> {
    let id = resolve(&state, kind, &slug)?;
    let update: VisibilityUpdate = flags.into_iter().collect();
    let record = state
        .platform
        .update_visibility(kind, id, &update, &viewer)?;
    Ok(Json(SuccessResponse::new(VisibilityJson::from(&record))))
}

async fn invite(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
    AppJson(request): AppJson<InviteRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<InviteJson>>), AppError> {
    let id = resolve(&state, kind, &slug)?;
    let invite = state
        .platform
        .invite(kind, id, request.profile, request.role.into(), &viewer)?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(InviteJson::from(&invite))),
    ))
}

async fn list_invites(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<Vec<InviteJson>> {
    let id = resolve(&state, kind, &slug)?;
    let invites = state.platform.invites_for_entity(kind, id, &viewer)?;
    Ok(Json(SuccessResponse::new(
        invites.iter().map(InviteJson::from).collect(),
    )))
}

/// Ask to join an entity's team.
async fn request_membership(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
    AppJson(request): AppJson<MembershipRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<InviteJson>>), AppError> {
    let id = resolve(&state, kind, &slug)?;
    let invite = state
        .platform
        .request_membership(kind, id, request.role.into(), &viewer)?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(InviteJson::from(&invite))),
    ))
}

async fn remove_member(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath((slug, profile)): AppPath<(String, EntityId)>,
    AppQuery(query): AppQuery<RoleQuery>,
) -> Reply<RemovedMemberJson> {
    let id = resolve(&state, kind, &slug)?;
    let removed = state
        .platform
        .remove_member(kind, id, profile, query.role.into(), &viewer)?;
    Ok(Json(SuccessResponse::new(RemovedMemberJson::from(&removed))))
}

async fn event_root(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<serde_json::Value> {
    let root = state.platform.loader().event_root(&slug, &viewer)?;
    Ok(Json(SuccessResponse::new(document_to_json(&root))))
}

async fn event_children(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(slug): AppPath<String>,
) -> Reply<Vec<serde_json::Value>> {
    let children = state.platform.loader().event_children(&slug, &viewer)?;
    Ok(Json(SuccessResponse::new(
        children.iter().map(document_to_json).collect(),
    )))
}
