//! Invites and join requests of the signed-in viewer.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mintnet_proto::EntityId;

use crate::error::AppError;
use crate::extract::{AppPath, CurrentViewer};
use crate::json::{InviteJson, SuccessResponse};
use crate::AppState;

/// Invite routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invites", get(my_invites))
        .route("/invites/:id/accept", post(accept))
        .route("/invites/:id/reject", post(reject))
        .route("/invites/:id/cancel", post(cancel))
}

/// Invites addressed to, and requests made by, the viewer.
async fn my_invites(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
) -> Result<Json<SuccessResponse<Vec<InviteJson>>>, AppError> {
    let invites = state.platform.invites_for_viewer(&viewer)?;
    Ok(Json(SuccessResponse::new(
        invites.iter().map(InviteJson::from).collect(),
    )))
}

async fn accept(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(id): AppPath<EntityId>,
) -> Result<Json<SuccessResponse<InviteJson>>, AppError> {
    let invite = state.platform.accept(id, &viewer)?;
    Ok(Json(SuccessResponse::new(InviteJson::from(&invite))))
}

async fn reject(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(id): AppPath<EntityId>,
) -> Result<Json<SuccessResponse<InviteJson>>, AppError> {
    let invite = state.platform.reject(id, &viewer)?;
    Ok(Json(SuccessResponse::new(InviteJson::from(&invite))))
}

async fn cancel(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    AppPath(id): AppPath<EntityId>,
) -> Result<Json<SuccessResponse<InviteJson>>, AppError> {
    let invite = state.platform.cancel(id, &viewer)?;
    Ok(Json(SuccessResponse::new(InviteJson::from(&invite))))
}
