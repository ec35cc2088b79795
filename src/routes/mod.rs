use axum::Router;

use crate::state::SharedState;

/// Privilege check for mutating routes.
pub mod auth;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check routes.
pub mod health;
/// Status read and refresh routes.
pub mod status;
/// Target management routes.
pub mod targets;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(status::router())
        .merge(targets::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
