//! Short-TTL cache over the status source.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::warn;

use super::{StatusSource, models::StatusSnapshot};

/// Maximum age of a cached snapshot before it must be refetched.
pub const CACHE_TTL: Duration = Duration::from_secs(10);

struct CacheEntry {
    fetched_at: Instant,
    snapshot: StatusSnapshot,
}

/// Caches the last snapshot per target to bound provider request volume.
///
/// Failed fetches are cached too, as offline snapshots, so a provider outage
/// cannot turn into a fetch storm. Concurrent misses for the same target are
/// not collapsed; each one fetches.
pub struct StatusCache {
    source: Arc<dyn StatusSource>,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl StatusCache {
    /// Cache over `source` with the default freshness window.
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self::with_ttl(source, CACHE_TTL)
    }

    /// Cache over `source` with an explicit freshness window.
    pub fn with_ttl(source: Arc<dyn StatusSource>, ttl: Duration) -> Self {
        Self {
            source,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Return the cached snapshot when fresh, otherwise fetch and cache.
    ///
    /// This layer never fails: a fetch error becomes an offline snapshot
    /// carrying the failure description, so callers always have something
    /// renderable.
    pub async fn get_or_fetch(&self, target_id: &str) -> StatusSnapshot {
        if let Some(entry) = self.entries.get(target_id) {
            if entry.fetched_at.elapsed() < self.ttl {
                return entry.snapshot.clone();
            }
        }

        let snapshot = match self.source.fetch_snapshot(target_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(target_id, error = %err, "status fetch failed");
                StatusSnapshot::failure(target_id, err.to_string())
            }
        };

        self.entries.insert(
            target_id.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                snapshot: snapshot.clone(),
            },
        );
        snapshot
    }

    /// Drop the cached entry so the next read re-polls the provider.
    pub fn invalidate(&self, target_id: &str) {
        self.entries.remove(target_id);
    }
}
