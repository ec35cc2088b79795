//! Privilege check for mutating routes.
//!
//! The check is a single bearer token; the actual role model lives on the
//! chat platform. When no token is configured the routes are open, which the
//! startup log calls out.

use axum::http::{HeaderMap, header};

use crate::{error::ApiError, state::SharedState};

/// Verify that the caller presented the configured admin token.
pub fn require_privileged(state: &SharedState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config().admin_token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("admin token required".into())),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use crate::testing::{FakeSource, test_state};

    use super::*;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn open_access_when_no_token_is_configured() {
        let (state, _dir) = test_state(FakeSource::online()).await;
        assert!(require_privileged(&state, &HeaderMap::new()).is_ok());
    }

    #[tokio::test]
    async fn requires_matching_token_when_configured() {
        let (state, _dir) = test_state(FakeSource::online()).await;
        let mut config = state.config().clone();
        config.admin_token = Some("sesame".into());
        let state = crate::state::AppState::initialise(config, FakeSource::online()).await;

        assert!(require_privileged(&state, &bearer("sesame")).is_ok());
        assert!(require_privileged(&state, &bearer("wrong")).is_err());
        assert!(require_privileged(&state, &HeaderMap::new()).is_err());
    }
}
