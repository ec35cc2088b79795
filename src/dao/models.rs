use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tracked game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Target {
    /// Provider-issued numeric identifier, kept verbatim as a string.
    pub id: String,
    /// Display name shown on the status message and in the select menu.
    pub name: String,
}

/// Persisted registry document: every tracked target in insertion order.
///
/// Insertion order doubles as the display order and as the fallback order
/// when no explicit selection exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Tracked targets, oldest first.
    #[serde(default)]
    pub servers: Vec<Target>,
}

/// Persisted singleton describing the external display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Handle of the display message, once one has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_message_id: Option<String>,
    /// Identifier of the currently selected target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_target_id: Option<String>,
}
