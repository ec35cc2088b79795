use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` while no display gateway is installed.
    pub status: String,
}

impl HealthResponse {
    /// The display gateway is installed and updates can flow.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// No display gateway is installed; only the API surface works.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
