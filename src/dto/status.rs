use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::Target,
    provider::models::StatusSnapshot,
    state::PollerPhase,
};

/// Current status of the active target as served by `/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// The active target, when one is registered.
    pub active: Option<Target>,
    /// Latest snapshot for the active target (or the empty-registry
    /// placeholder).
    pub snapshot: StatusSnapshot,
    /// Phase of the background poller (`"idle"` or `"fetching"`).
    pub poller: String,
    /// Whether the application runs without a display gateway.
    pub degraded: bool,
}

impl StatusResponse {
    /// Assemble the response from its parts.
    pub fn new(
        active: Option<Target>,
        snapshot: StatusSnapshot,
        poller: PollerPhase,
        degraded: bool,
    ) -> Self {
        let poller = match poller {
            PollerPhase::Idle => "idle".to_string(),
            PollerPhase::Fetching => "fetching".to_string(),
        };
        Self {
            active,
            snapshot,
            poller,
            degraded,
        }
    }
}
