use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::{
    dto::status::StatusResponse,
    error::ApiError,
    services::{sync_service, target_service::{self, UserAction}},
    state::SharedState,
};

/// Routes serving the current status and the user-triggered refresh.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/status", get(current_status))
        .route("/status/refresh", post(refresh_status))
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    responses((status = 200, description = "Status of the active target", body = StatusResponse))
)]
/// Current snapshot of the active target, served from the cache when fresh.
pub async fn current_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let (active, snapshot) = sync_service::peek_status(&state).await;
    let degraded = state.is_degraded().await;
    Json(StatusResponse::new(
        active,
        snapshot,
        state.poller_phase(),
        degraded,
    ))
}

#[utoipa::path(
    post,
    path = "/status/refresh",
    tag = "status",
    responses((status = 200, description = "Display refreshed", body = StatusResponse))
)]
/// Re-poll the active target and redraw the display.
pub async fn refresh_status(
    State(state): State<SharedState>,
) -> Result<Json<StatusResponse>, ApiError> {
    target_service::apply(&state, UserAction::Refresh).await?;

    let (active, snapshot) = sync_service::peek_status(&state).await;
    let degraded = state.is_degraded().await;
    Ok(Json(StatusResponse::new(
        active,
        snapshot,
        state.poller_phase(),
        degraded,
    )))
}
