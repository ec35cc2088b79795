//! User-triggered target operations.
//!
//! Every control-surface mutation is expressed as a [`UserAction`] and
//! dispatched through [`apply`], which validates the input, mutates the
//! registry, and drives the reconciliation engine.

use tracing::{error, warn};

use crate::{
    dao::{
        models::Target,
        registry::{AddOutcome, RemoveOutcome},
    },
    error::ServiceError,
    provider,
    state::SharedState,
};

use super::sync_service;

/// User actions dispatched through [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Make the given target the active selection.
    Select(String),
    /// Register a new target from a provider link or bare id.
    Add(String),
    /// Unregister a target by id.
    Remove(String),
    /// Re-poll the active target and redraw the display.
    Refresh,
}

/// Outcome reported back to the caller of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Target registered.
    Added(Target),
    /// Target unregistered.
    Removed {
        /// Identifier of the removed target.
        id: String,
    },
    /// Selection changed to the given target.
    Selected {
        /// Identifier of the newly selected target.
        id: String,
    },
    /// Display redrawn for the active target, if any.
    Refreshed {
        /// Identifier of the target that was refreshed.
        active_id: Option<String>,
    },
}

/// Dispatch a user action to the reconciliation engine.
pub async fn apply(state: &SharedState, action: UserAction) -> Result<ActionOutcome, ServiceError> {
    match action {
        UserAction::Select(id) => select_target(state, id).await,
        UserAction::Add(link) => add_target(state, &link).await,
        UserAction::Remove(id) => remove_target(state, &id).await,
        UserAction::Refresh => refresh(state).await,
    }
}

/// Pick the id at the removed slot, falling back to the new last entry.
pub fn successor_after_removal(remaining: &[Target], removed_index: usize) -> Option<String> {
    if remaining.is_empty() {
        return None;
    }
    let index = removed_index.min(remaining.len() - 1);
    Some(remaining[index].id.clone())
}

async fn add_target(state: &SharedState, link: &str) -> Result<ActionOutcome, ServiceError> {
    let Some(id) = provider::extract_target_id(link) else {
        return Err(ServiceError::InvalidInput(
            "not a provider server link or numeric id".into(),
        ));
    };
    if state.registry().contains(&id).await {
        return Err(ServiceError::DuplicateTarget(id));
    }

    let name = fetch_display_name(state, &id).await;
    let target = Target { id, name };

    match state.registry().add(target.clone()).await {
        AddOutcome::Added(target) => {
            reconcile_best_effort(state, None).await;
            Ok(ActionOutcome::Added(target))
        }
        // Lost the race against a concurrent add of the same id.
        AddOutcome::Duplicate => Err(ServiceError::DuplicateTarget(target.id)),
    }
}

async fn remove_target(state: &SharedState, id: &str) -> Result<ActionOutcome, ServiceError> {
    let selected = state.session().selected_target_id().await;

    match state.registry().remove(id).await {
        RemoveOutcome::NotFound => Err(ServiceError::NotFound(format!(
            "target `{id}` is not registered"
        ))),
        RemoveOutcome::Removed { index } => {
            // Only steer the selection when the removed target was active;
            // otherwise the persisted selection still stands.
            let preferred = if selected.as_deref() == Some(id) {
                successor_after_removal(&state.registry().list().await, index)
            } else {
                None
            };
            reconcile_best_effort(state, preferred.as_deref()).await;
            Ok(ActionOutcome::Removed { id: id.to_string() })
        }
    }
}

async fn select_target(state: &SharedState, id: String) -> Result<ActionOutcome, ServiceError> {
    if !state.registry().contains(&id).await {
        return Err(ServiceError::NotFound(format!(
            "target `{id}` is not registered"
        )));
    }
    sync_service::reconcile(state, Some(&id)).await?;
    Ok(ActionOutcome::Selected { id })
}

async fn refresh(state: &SharedState) -> Result<ActionOutcome, ServiceError> {
    // Bust the cache for the active target so the redraw re-polls.
    let targets = state.registry().list().await;
    let persisted = state.session().selected_target_id().await;
    if let Some(active) = sync_service::resolve_active(None, persisted.as_deref(), &targets) {
        state.cache().invalidate(&active);
    }

    let report = sync_service::reconcile(state, None).await?;
    Ok(ActionOutcome::Refreshed {
        active_id: report.active_id,
    })
}

/// Provider-reported name with a deterministic fallback.
async fn fetch_display_name(state: &SharedState, id: &str) -> String {
    match state.status_source().fetch_name(id).await {
        Ok(Some(name)) => name,
        Ok(None) => format!("Server {id}"),
        Err(err) => {
            warn!(target_id = id, error = %err, "could not fetch server name; using fallback");
            format!("Server {id}")
        }
    }
}

/// Registry changes stand on their own; a display failure after one is
/// logged rather than failing the user's mutation.
async fn reconcile_best_effort(state: &SharedState, preferred: Option<&str>) {
    if let Err(err) = sync_service::reconcile(state, preferred).await {
        error!(error = %err, "display reconciliation failed after registry change");
    }
}
