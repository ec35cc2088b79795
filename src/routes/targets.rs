use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::targets::{AddTargetRequest, TargetActionResponse, TargetListResponse},
    error::ApiError,
    services::target_service::{self, ActionOutcome, UserAction},
    state::SharedState,
};

use super::auth;

/// Routes managing the set of tracked targets.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/targets", get(list_targets).post(add_target))
        .route("/targets/{id}", delete(remove_target))
        .route("/targets/{id}/select", post(select_target))
}

#[utoipa::path(
    get,
    path = "/targets",
    tag = "targets",
    responses((status = 200, description = "Tracked targets", body = TargetListResponse))
)]
/// List every tracked target plus the current selection.
pub async fn list_targets(State(state): State<SharedState>) -> Json<TargetListResponse> {
    let targets = state.registry().list().await;
    let selected_id = state.session().selected_target_id().await;
    Json(TargetListResponse {
        targets,
        selected_id,
    })
}

#[utoipa::path(
    post,
    path = "/targets",
    tag = "targets",
    request_body = AddTargetRequest,
    responses(
        (status = 200, description = "Target registered", body = TargetActionResponse),
        (status = 409, description = "Target already registered")
    )
)]
/// Register a new target from a provider link or bare id.
pub async fn add_target(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Valid(Json(payload)): Valid<Json<AddTargetRequest>>,
) -> Result<Json<TargetActionResponse>, ApiError> {
    auth::require_privileged(&state, &headers)?;

    match target_service::apply(&state, UserAction::Add(payload.link)).await? {
        ActionOutcome::Added(target) => Ok(Json(TargetActionResponse {
            id: target.id,
            name: Some(target.name),
        })),
        other => Err(ApiError::Internal(format!(
            "unexpected outcome for add: {other:?}"
        ))),
    }
}

#[utoipa::path(
    delete,
    path = "/targets/{id}",
    tag = "targets",
    params(("id" = String, Path, description = "Identifier of the target to remove")),
    responses(
        (status = 200, description = "Target removed", body = TargetActionResponse),
        (status = 404, description = "Target not registered")
    )
)]
/// Unregister a target by id.
pub async fn remove_target(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TargetActionResponse>, ApiError> {
    auth::require_privileged(&state, &headers)?;

    match target_service::apply(&state, UserAction::Remove(id)).await? {
        ActionOutcome::Removed { id } => Ok(Json(TargetActionResponse { id, name: None })),
        other => Err(ApiError::Internal(format!(
            "unexpected outcome for remove: {other:?}"
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/targets/{id}/select",
    tag = "targets",
    params(("id" = String, Path, description = "Identifier of the target to select")),
    responses(
        (status = 200, description = "Target selected", body = TargetActionResponse),
        (status = 404, description = "Target not registered")
    )
)]
/// Make the given target the active selection and redraw the display.
pub async fn select_target(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TargetActionResponse>, ApiError> {
    match target_service::apply(&state, UserAction::Select(id)).await? {
        ActionOutcome::Selected { id } => Ok(Json(TargetActionResponse { id, name: None })),
        other => Err(ApiError::Internal(format!(
            "unexpected outcome for select: {other:?}"
        ))),
    }
}
