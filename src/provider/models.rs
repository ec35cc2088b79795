use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of one status fetch attempt. Immutable once constructed; failed
/// fetches are represented as offline snapshots carrying an error, never as
/// partially filled data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusSnapshot {
    /// Identifier of the target this snapshot describes.
    pub target_id: String,
    /// Whether the provider reports the server as online.
    pub online: bool,
    /// Server name reported by the provider.
    pub name: String,
    /// Current player count, when reported.
    pub players: Option<u32>,
    /// Player capacity, when reported.
    pub max_players: Option<u32>,
    /// `ip:port` game endpoint, when both parts are reported.
    pub endpoint: Option<String>,
    /// In-game clock scraped from the provider's server page.
    pub in_game_time: Option<String>,
    /// Human-readable name of the backing provider.
    pub source: String,
    /// Failure description when the fetch produced no usable data.
    pub error: Option<String>,
}

impl StatusSnapshot {
    /// Offline snapshot describing a failed fetch.
    pub fn failure(target_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            online: false,
            name: String::new(),
            players: None,
            max_players: None,
            endpoint: None,
            in_game_time: None,
            source: super::SOURCE_NAME.to_string(),
            error: Some(error.into()),
        }
    }
}

/// Top-level payload of the provider's server endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerEnvelope {
    #[serde(default)]
    pub data: ServerData,
}

/// `data` object of the server payload.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerData {
    #[serde(default)]
    pub attributes: ServerAttributes,
}

/// `data.attributes` object of the server payload. Every field is optional;
/// a missing field degrades the snapshot instead of failing the fetch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerAttributes {
    pub name: Option<String>,
    pub status: Option<String>,
    pub players: Option<u32>,
    pub max_players: Option<u32>,
    pub ip: Option<String>,
    pub port: Option<u32>,
}
