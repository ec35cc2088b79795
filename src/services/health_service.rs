use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report overall health, probing the display message while at it so
/// connectivity trouble shows up in the logs.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.display().await {
        Some(gateway) => {
            if let Some(handle) = state.session().display_message_id().await {
                if let Err(err) = gateway.fetch_message(handle).await {
                    warn!(error = %err, "display message probe failed");
                }
            }
        }
        None => warn!("display gateway unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
