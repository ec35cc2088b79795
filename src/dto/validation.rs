//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::provider::extract_target_id;

/// Validates that a submitted target reference is either a provider server
/// link or a bare numeric id.
///
/// # Examples
///
/// ```ignore
/// validate_target_link("https://www.battlemetrics.com/servers/dayz/12345") // Ok
/// validate_target_link("12345")   // Ok
/// validate_target_link("roughly") // Err - neither link nor id
/// ```
pub fn validate_target_link(link: &str) -> Result<(), ValidationError> {
    if extract_target_id(link).is_none() {
        let mut err = ValidationError::new("target_link_format");
        err.message =
            Some("must be a provider server link or a bare numeric server id".into());
        return Err(err);
    }
    Ok(())
}
