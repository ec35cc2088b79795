//! Durable registry of tracked targets.
//!
//! The registry keeps an in-memory mirror of the persisted document and
//! writes through on every mutation. When the write fails the mutation is
//! kept in memory and the failure is logged; memory is the source of truth
//! for the remainder of the process's life.

use tokio::sync::RwLock;
use tracing::warn;

use super::{
    document::DocumentStore,
    models::{RegistryDocument, Target},
};

/// Outcome of [`TargetRegistry::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Target appended and persisted.
    Added(Target),
    /// A target with the same id already exists; nothing changed.
    Duplicate,
}

/// Outcome of [`TargetRegistry::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Target removed; `index` is its position before removal.
    Removed {
        /// Index the target occupied in the pre-removal order.
        index: usize,
    },
    /// No target with the given id exists.
    NotFound,
}

/// Ordered, durable collection of tracked targets.
pub struct TargetRegistry {
    targets: RwLock<Vec<Target>>,
    store: DocumentStore,
}

impl TargetRegistry {
    /// Load the registry from disk, starting empty when no document exists.
    pub async fn open(store: DocumentStore) -> Self {
        let document: RegistryDocument = store.load().await;
        Self {
            targets: RwLock::new(document.servers),
            store,
        }
    }

    /// Every tracked target in insertion order.
    pub async fn list(&self) -> Vec<Target> {
        self.targets.read().await.clone()
    }

    /// Whether a target with the given id is tracked.
    pub async fn contains(&self, id: &str) -> bool {
        self.targets.read().await.iter().any(|target| target.id == id)
    }

    /// Look up a tracked target by id.
    pub async fn get(&self, id: &str) -> Option<Target> {
        self.targets
            .read()
            .await
            .iter()
            .find(|target| target.id == id)
            .cloned()
    }

    /// Append a target unless its id is already tracked. Persists before
    /// returning; a persistence failure degrades to memory-only.
    pub async fn add(&self, target: Target) -> AddOutcome {
        let mut targets = self.targets.write().await;
        if targets.iter().any(|existing| existing.id == target.id) {
            return AddOutcome::Duplicate;
        }
        targets.push(target.clone());
        self.persist(&targets).await;
        AddOutcome::Added(target)
    }

    /// Remove the target with the given id, reporting its pre-removal index.
    /// Persists only when something was actually removed.
    pub async fn remove(&self, id: &str) -> RemoveOutcome {
        let mut targets = self.targets.write().await;
        let Some(index) = targets.iter().position(|target| target.id == id) else {
            return RemoveOutcome::NotFound;
        };
        targets.remove(index);
        self.persist(&targets).await;
        RemoveOutcome::Removed { index }
    }

    async fn persist(&self, targets: &[Target]) {
        let document = RegistryDocument {
            servers: targets.to_vec(),
        };
        if let Err(err) = self.store.save(&document).await {
            warn!(error = %err, "failed to persist registry; keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::dao::document::write_lock;

    use super::*;

    fn target(id: &str) -> Target {
        Target {
            id: id.into(),
            name: format!("Server {id}"),
        }
    }

    async fn registry_in(dir: &TempDir) -> TargetRegistry {
        let store = DocumentStore::new(dir.path().join("servers.json"), write_lock());
        TargetRegistry::open(store).await
    }

    #[tokio::test]
    async fn add_persists_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir).await;

        assert_eq!(
            registry.add(target("1")).await,
            AddOutcome::Added(target("1"))
        );
        assert_eq!(
            registry.add(target("2")).await,
            AddOutcome::Added(target("2"))
        );

        let reopened = registry_in(&dir).await;
        let ids: Vec<_> = reopened.list().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_and_leaves_document_untouched() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir).await;
        registry.add(target("1")).await;

        let before = std::fs::read(dir.path().join("servers.json")).unwrap();
        assert_eq!(registry.add(target("1")).await, AddOutcome::Duplicate);
        let after = std::fs::read(dir.path().join("servers.json")).unwrap();

        assert_eq!(before, after);
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_id_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir).await;
        registry.add(target("1")).await;

        assert_eq!(registry.remove("99").await, RemoveOutcome::NotFound);
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn remove_reports_pre_removal_index_and_persists() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir).await;
        for id in ["1", "2", "3"] {
            registry.add(target(id)).await;
        }

        assert_eq!(
            registry.remove("2").await,
            RemoveOutcome::Removed { index: 1 }
        );

        let reopened = registry_in(&dir).await;
        let ids: Vec<_> = reopened.list().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
