//! Memoized task catalog
//!
//! The catalog is every `(root, script)` pair of every loaded root. It is
//! recomputed on demand and reused until a root goes stale or the registry
//! epoch moves past the epoch the cached value was computed at.

use super::task::TaskGroup;
use crate::workspace::{RegistryEvent, RootHandle, RootRegistry, Subscription};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// One runnable script of one root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogEntry {
    pub root: RootHandle,
    pub script: String,
}

impl CatalogEntry {
    /// Task group implied by the script name
    pub fn group(&self) -> Option<TaskGroup> {
        TaskGroup::classify(&self.script)
    }
}

#[derive(Debug)]
struct Cached {
    epoch: u64,
    entries: Arc<Vec<CatalogEntry>>,
}

type Slot = Arc<Mutex<Option<Cached>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Cached>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cross-root task catalog with memoization
pub struct CatalogCache {
    registry: Arc<RootRegistry>,
    slot: Slot,
    _subscription: Subscription,
}

impl CatalogCache {
    /// Create a catalog over `registry`, dropping the cached value on
    /// every registry event
    pub fn new(registry: Arc<RootRegistry>) -> Self {
        let slot: Slot = Arc::default();
        let subscription = {
            let slot = Arc::clone(&slot);
            registry.subscribe(move |event: &RegistryEvent| {
                debug!("Catalog invalidated by {:?}", event);
                *lock(&slot) = None;
            })
        };

        Self {
            registry,
            slot,
            _subscription: subscription,
        }
    }

    /// Every `(root, script)` pair of every loaded root.
    ///
    /// Returns the memoized value when no root is stale and nothing
    /// changed since it was computed. A value computed while an event
    /// raced in is stored under the epoch observed before computing, so
    /// the next call recomputes.
    pub async fn get_catalog(&self) -> Arc<Vec<CatalogEntry>> {
        if let Some(epoch) = self.registry.clean_epoch() {
            if let Some(cached) = lock(&self.slot).as_ref().filter(|c| c.epoch == epoch) {
                debug!("Tasks requested [Cached]");
                return Arc::clone(&cached.entries);
            }
        }

        let epoch = self.registry.epoch();
        let entries = Arc::new(self.compute());

        {
            let mut slot = lock(&self.slot);
            let newer_stored = slot.as_ref().is_some_and(|c| c.epoch > epoch);
            if !newer_stored {
                *slot = Some(Cached {
                    epoch,
                    entries: Arc::clone(&entries),
                });
            }
        }

        debug!("Tasks requested [Ok]: {} tasks returned", entries.len());
        entries
    }

    fn compute(&self) -> Vec<CatalogEntry> {
        let mut roots = self.registry.list_roots();
        roots.sort_by(|a, b| a.handle.path().cmp(b.handle.path()));

        roots
            .into_iter()
            .filter(|r| r.is_loaded())
            .flat_map(|r| {
                let root = r.handle;
                r.scripts.into_iter().map(move |script| CatalogEntry {
                    root: root.clone(),
                    script,
                })
            })
            .collect()
    }

    /// Drop the memoized value
    pub fn invalidate(&self) {
        *lock(&self.slot) = None;
    }

    /// Whether a memoized value is held (it may still be outdated)
    pub fn is_cached(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Entry for `script` in a loaded root, read directly from the root
    pub fn resolve_task(&self, root: &RootHandle, script: &str) -> Option<CatalogEntry> {
        let snapshot = self.registry.get(root)?;
        if snapshot.is_loaded() && snapshot.scripts.contains(script) {
            Some(CatalogEntry {
                root: snapshot.handle,
                script: script.to_string(),
            })
        } else {
            None
        }
    }

    /// Catalog entry for `script` in the root at `root_dir`
    pub async fn find_task(&self, root_dir: &Path, script: &str) -> Option<CatalogEntry> {
        self.get_catalog()
            .await
            .iter()
            .find(|e| e.script == script && e.root.path() == root_dir)
            .cloned()
    }

    pub fn registry(&self) -> &Arc<RootRegistry> {
        &self.registry
    }
}
