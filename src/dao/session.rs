//! Durable display/session state.

use tokio::sync::RwLock;
use tracing::warn;

use super::{document::DocumentStore, models::SessionDocument};

/// Singleton session record: which external message is ours and which target
/// is currently shown on it. Mutated by the reconciliation engine only.
pub struct SessionStore {
    state: RwLock<SessionDocument>,
    store: DocumentStore,
}

impl SessionStore {
    /// Load the session from disk, starting empty when no document exists.
    pub async fn open(store: DocumentStore) -> Self {
        let document: SessionDocument = store.load().await;
        Self {
            state: RwLock::new(document),
            store,
        }
    }

    /// Copy of the current session document.
    pub async fn snapshot(&self) -> SessionDocument {
        self.state.read().await.clone()
    }

    /// Identifier of the currently selected target, if any.
    pub async fn selected_target_id(&self) -> Option<String> {
        self.state.read().await.selected_target_id.clone()
    }

    /// Handle of the display message, if one has been created.
    pub async fn display_message_id(&self) -> Option<String> {
        self.state.read().await.display_message_id.clone()
    }

    /// Record the resolved selection. Returns `true` when the value changed;
    /// an unchanged selection is not rewritten to disk.
    pub async fn set_selected(&self, id: Option<String>) -> bool {
        let mut state = self.state.write().await;
        if state.selected_target_id == id {
            return false;
        }
        state.selected_target_id = id;
        self.persist(&state).await;
        true
    }

    /// Record the handle of a freshly created display message.
    pub async fn set_display_message(&self, handle: String) {
        let mut state = self.state.write().await;
        if state.display_message_id.as_deref() == Some(handle.as_str()) {
            return;
        }
        state.display_message_id = Some(handle);
        self.persist(&state).await;
    }

    async fn persist(&self, document: &SessionDocument) {
        if let Err(err) = self.store.save(document).await {
            warn!(error = %err, "failed to persist session state; keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::dao::document::write_lock;

    use super::*;

    async fn session_in(dir: &TempDir) -> SessionStore {
        let store = DocumentStore::new(dir.path().join("status_state.json"), write_lock());
        SessionStore::open(store).await
    }

    #[tokio::test]
    async fn selection_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir).await;

        assert!(session.set_selected(Some("42".into())).await);
        session.set_display_message("m-1".into()).await;

        let reopened = session_in(&dir).await;
        assert_eq!(reopened.selected_target_id().await.as_deref(), Some("42"));
        assert_eq!(reopened.display_message_id().await.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn unchanged_selection_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir).await;
        session.set_selected(Some("42".into())).await;

        let path = dir.path().join("status_state.json");
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert!(!session.set_selected(Some("42".into())).await);
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn selection_can_be_cleared() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir).await;
        session.set_selected(Some("42".into())).await;

        assert!(session.set_selected(None).await);
        assert_eq!(session.selected_target_id().await, None);
    }
}
