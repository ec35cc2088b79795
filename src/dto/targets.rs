use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::Target;

use super::validation::validate_target_link;

/// Request to register a new target.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddTargetRequest {
    /// Provider server link or bare numeric id.
    #[validate(
        length(min = 1, max = 300),
        custom(function = validate_target_link)
    )]
    pub link: String,
}

/// Every tracked target plus the current selection.
#[derive(Debug, Serialize, ToSchema)]
pub struct TargetListResponse {
    /// Tracked targets in display order.
    pub targets: Vec<Target>,
    /// Identifier of the currently selected target, if any.
    pub selected_id: Option<String>,
}

/// Result of a target mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct TargetActionResponse {
    /// Identifier of the affected target.
    pub id: String,
    /// Display name of the affected target, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
