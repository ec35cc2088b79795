//! Reconciliation of the active target into the external display.
//!
//! Both the background poller and every user-triggered mutation funnel into
//! [`reconcile`]. Two cycles may interleave at suspension points; each
//! resolves its own view and the later completion's writes win. Session
//! writes are whole-document and the display upsert is idempotent, so the
//! race cannot corrupt state.

use tracing::{error, info};

use crate::{
    dao::models::Target,
    display::{DisplayContent, DisplayError, DisplayGateway, render},
    error::ServiceError,
    provider::models::StatusSnapshot,
    state::SharedState,
};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Target resolved as active, if any.
    pub active_id: Option<String>,
    /// Snapshot rendered into the display.
    pub snapshot: StatusSnapshot,
    /// What happened to the display artifact.
    pub artifact: ArtifactAction,
}

/// How the display artifact was brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactAction {
    /// A new message was created and its handle persisted.
    Created,
    /// The existing message was edited in place.
    Updated,
}

/// Resolve the authoritative active target id.
///
/// Priority: the explicit preference when registered, the persisted selection
/// when still registered, the first registered target, none.
pub fn resolve_active(
    preferred: Option<&str>,
    persisted: Option<&str>,
    targets: &[Target],
) -> Option<String> {
    for candidate in [preferred, persisted].into_iter().flatten() {
        if targets.iter().any(|target| target.id == candidate) {
            return Some(candidate.to_string());
        }
    }
    targets.first().map(|target| target.id.clone())
}

/// Snapshot rendered when no targets are registered.
pub fn empty_registry_snapshot() -> StatusSnapshot {
    StatusSnapshot::failure("", "No servers registered")
}

/// Bring the external display in sync with the resolved active target.
///
/// Resolves the active id, fetches its snapshot through the cache (or
/// synthesizes the empty-registry snapshot), persists the selection when it
/// changed, then edits the recorded message in place. A vanished message is
/// recovered by creating a replacement; a forbidden edit aborts the cycle
/// without touching session state.
pub async fn reconcile(
    state: &SharedState,
    preferred: Option<&str>,
) -> Result<ReconcileReport, ServiceError> {
    let targets = state.registry().list().await;
    let persisted = state.session().selected_target_id().await;
    let active = resolve_active(preferred, persisted.as_deref(), &targets);

    let snapshot = match active.as_deref() {
        Some(id) => state.cache().get_or_fetch(id).await,
        None => empty_registry_snapshot(),
    };

    if state.session().set_selected(active.clone()).await {
        info!(
            active = active.as_deref().unwrap_or("none"),
            "active target changed"
        );
    }

    let content = render::render_status(&snapshot, &targets, active.as_deref());
    let gateway = state.display().await.ok_or(ServiceError::Degraded)?;

    let artifact = match state.session().display_message_id().await {
        Some(handle) => {
            match gateway.edit_message(handle.clone(), content.clone()).await {
                Ok(()) => ArtifactAction::Updated,
                Err(DisplayError::NotFound) => {
                    info!(%handle, "display message vanished; creating a replacement");
                    create_message(state, gateway.as_ref(), content).await?
                }
                Err(DisplayError::Forbidden(detail)) => {
                    error!(%handle, %detail, "display edit forbidden; aborting cycle");
                    return Err(ServiceError::DisplayForbidden(detail));
                }
                Err(err) => return Err(ServiceError::Display(err)),
            }
        }
        None => create_message(state, gateway.as_ref(), content).await?,
    };

    Ok(ReconcileReport {
        active_id: active,
        snapshot,
        artifact,
    })
}

/// Peek at the current active target and its snapshot without touching the
/// display.
pub async fn peek_status(state: &SharedState) -> (Option<Target>, StatusSnapshot) {
    let targets = state.registry().list().await;
    let persisted = state.session().selected_target_id().await;
    let active = resolve_active(None, persisted.as_deref(), &targets);

    match active {
        Some(id) => {
            let snapshot = state.cache().get_or_fetch(&id).await;
            let target = state.registry().get(&id).await;
            (target, snapshot)
        }
        None => (None, empty_registry_snapshot()),
    }
}

async fn create_message(
    state: &SharedState,
    gateway: &dyn DisplayGateway,
    content: DisplayContent,
) -> Result<ArtifactAction, ServiceError> {
    match gateway.create_message(content).await {
        Ok(handle) => {
            state.session().set_display_message(handle).await;
            Ok(ArtifactAction::Created)
        }
        Err(DisplayError::Forbidden(detail)) => {
            error!(%detail, "display create forbidden; aborting cycle");
            Err(ServiceError::DisplayForbidden(detail))
        }
        Err(err) => Err(ServiceError::Display(err)),
    }
}
