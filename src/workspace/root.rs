//! Per-root manifest state machine
//!
//! Each workspace root owns one [`RootState`] and one reload worker task.
//! Staleness is the only trigger for a reload:
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Unloaded | added (stale) | Loading |
//! | Loading | disabled in config | Disabled |
//! | Loading | manifest absent | Missing |
//! | Loading | read or parse failure | Error |
//! | Loading | parsed | Loaded |
//! | any settled state | watch event / config change | stale, then Loading |
//!
//! `mark_stale` bumps a generation counter and wakes the worker through a
//! single-permit [`Notify`], so any number of stale marks during a reload
//! coalesce into one follow-up reload. A reload only clears `stale` if the
//! generation it captured is still current when it finishes.

use super::registry::Shared;
use crate::manifest::{parse_manifest, Dependency, Manifest, MANIFEST_FILE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of a workspace root.
///
/// Two handles are equal only if they come from the same [`RootHandle::new`]
/// call; re-adding a directory after removal yields a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootHandle {
    id: Uuid,
    path: PathBuf,
}

impl RootHandle {
    /// Create a fresh handle for a root directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Root directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name, for display
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Path of this root's manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }
}

impl PartialEq for RootHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RootHandle {}

impl Hash for RootHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Load status of a root's manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootStatus {
    Unloaded,
    Loading,
    Loaded,
    Disabled,
    Missing,
    Error,
}

impl fmt::Display for RootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Disabled => "disabled",
            Self::Missing => "missing",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Point-in-time copy of a root's state.
///
/// `scripts` and `dependencies` are empty unless `status` is
/// [`RootStatus::Loaded`].
#[derive(Debug, Clone, Serialize)]
pub struct RootSnapshot {
    pub handle: RootHandle,
    pub manifest_path: PathBuf,
    pub enabled: bool,
    pub manifest_exists: bool,
    pub scripts: BTreeSet<String>,
    pub dependencies: Vec<Dependency>,
    pub status: RootStatus,
    pub stale: bool,
    pub pending_reload: bool,
    pub last_loaded: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl RootSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.status == RootStatus::Loaded
    }
}

/// Result of reading and parsing one manifest
#[derive(Debug)]
pub(crate) enum LoadOutcome {
    Disabled,
    Missing,
    Failed(String),
    Loaded(Manifest),
}

impl LoadOutcome {
    fn status(&self) -> RootStatus {
        match self {
            Self::Disabled => RootStatus::Disabled,
            Self::Missing => RootStatus::Missing,
            Self::Failed(_) => RootStatus::Error,
            Self::Loaded(_) => RootStatus::Loaded,
        }
    }
}

#[derive(Debug)]
struct RootData {
    enabled: bool,
    manifest_exists: bool,
    scripts: BTreeSet<String>,
    dependencies: Vec<Dependency>,
    status: RootStatus,
    stale: bool,
    generation: u64,
    pending_reload: bool,
    removed: bool,
    last_loaded: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl RootData {
    fn clear(&mut self) {
        self.scripts.clear();
        self.dependencies.clear();
    }
}

/// Cached manifest data for one workspace root
#[derive(Debug)]
pub(crate) struct RootState {
    handle: RootHandle,
    manifest_path: PathBuf,
    data: Mutex<RootData>,
    wake: Notify,
}

impl RootState {
    /// New root, stale and owing its first load
    pub(crate) fn new(handle: RootHandle) -> Self {
        let manifest_path = handle.manifest_path();
        Self {
            handle,
            manifest_path,
            data: Mutex::new(RootData {
                enabled: true,
                manifest_exists: false,
                scripts: BTreeSet::new(),
                dependencies: Vec::new(),
                status: RootStatus::Unloaded,
                stale: true,
                generation: 0,
                pending_reload: false,
                removed: false,
                last_loaded: None,
                last_error: None,
            }),
            wake: Notify::new(),
        }
    }

    pub(crate) fn handle(&self) -> &RootHandle {
        &self.handle
    }

    pub(crate) fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    fn data(&self) -> MutexGuard<'_, RootData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake the reload worker without changing state
    pub(crate) fn schedule(&self) {
        self.wake.notify_one();
    }

    /// Mark the cached data as untrustworthy and request a reload.
    ///
    /// Idempotent: repeated marks before the worker runs, or while a
    /// reload is in flight, result in a single follow-up reload. Returns
    /// `false` if the root has been removed.
    pub(crate) fn mark_stale(&self) -> bool {
        {
            let mut data = self.data();
            if data.removed {
                return false;
            }
            data.stale = true;
            data.generation += 1;
        }
        self.wake.notify_one();
        true
    }

    /// Detach from the registry; a reload finishing later is discarded
    pub(crate) fn mark_removed(&self) {
        self.data().removed = true;
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.data().stale
    }

    /// Stale or mid-reload
    pub(crate) fn is_busy(&self) -> bool {
        let data = self.data();
        data.stale || data.pending_reload
    }

    pub(crate) fn snapshot(&self) -> RootSnapshot {
        let data = self.data();
        RootSnapshot {
            handle: self.handle.clone(),
            manifest_path: self.manifest_path.clone(),
            enabled: data.enabled,
            manifest_exists: data.manifest_exists,
            scripts: data.scripts.clone(),
            dependencies: data.dependencies.clone(),
            status: data.status,
            stale: data.stale,
            pending_reload: data.pending_reload,
            last_loaded: data.last_loaded,
            last_error: data.last_error.clone(),
        }
    }

    /// Script names if loaded, `None` otherwise
    pub(crate) fn loaded_scripts(&self) -> Option<BTreeSet<String>> {
        let data = self.data();
        (data.status == RootStatus::Loaded).then(|| data.scripts.clone())
    }

    /// Enter `Loading` if a reload is owed, returning the generation the
    /// reload is for
    fn begin_reload(&self) -> Option<u64> {
        let mut data = self.data();
        if data.removed || !data.stale || data.pending_reload {
            return None;
        }
        data.status = RootStatus::Loading;
        data.pending_reload = true;
        data.clear();
        Some(data.generation)
    }

    /// Apply a finished reload. `stale` is only cleared when no stale mark
    /// arrived after `generation` was captured. The epoch is bumped before
    /// `stale` can be observed as cleared.
    fn finish_reload(&self, generation: u64, outcome: LoadOutcome, epoch: &AtomicU64) -> bool {
        let mut data = self.data();
        if data.removed {
            return false;
        }

        data.status = outcome.status();
        data.pending_reload = false;
        data.last_loaded = Some(Utc::now());
        data.last_error = None;
        data.enabled = true;
        data.manifest_exists = false;
        data.clear();

        match outcome {
            LoadOutcome::Disabled => data.enabled = false,
            LoadOutcome::Missing => {}
            LoadOutcome::Failed(reason) => {
                data.manifest_exists = true;
                data.last_error = Some(reason);
            }
            LoadOutcome::Loaded(manifest) => {
                data.manifest_exists = true;
                data.scripts = manifest.scripts;
                data.dependencies = manifest.dependencies;
            }
        }

        epoch.fetch_add(1, Ordering::SeqCst);
        if data.generation == generation {
            data.stale = false;
        }
        true
    }

    /// Read and parse the manifest
    async fn load(&self, shared: &Shared) -> LoadOutcome {
        let path = self.manifest_path.display();

        if !shared.settings.enabled_for(self.handle.path()) {
            info!("Workspace root [Disabled] \"{}\"", path);
            return LoadOutcome::Disabled;
        }

        let bytes = match shared.fs.read(&self.manifest_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Workspace root [Missing] \"{}\"", path);
                return LoadOutcome::Missing;
            }
            Err(e) => {
                warn!("Workspace root [Failed] \"{}\": {}", path, e);
                return LoadOutcome::Failed(format!("reading manifest: {}", e));
            }
        };

        match parse_manifest(&bytes) {
            Ok(manifest) => {
                info!(
                    "Workspace root [{} scripts, {} requires +dev] \"{}\"",
                    manifest.scripts.len(),
                    manifest.dependencies.len(),
                    path
                );
                LoadOutcome::Loaded(manifest)
            }
            Err(e) => {
                warn!("Workspace root [Failed] \"{}\": {}", path, e);
                LoadOutcome::Failed(e.to_string())
            }
        }
    }

    /// Reload worker: one per root, runs until the root is removed
    pub(crate) async fn run_reloads(self: Arc<Self>, shared: Arc<Shared>) {
        loop {
            self.wake.notified().await;

            while let Some(generation) = self.begin_reload() {
                debug!("Reloading {} (generation {})", self.manifest_path.display(), generation);
                let outcome = self.load(&shared).await;

                if !self.finish_reload(generation, outcome, &shared.epoch) {
                    debug!("Discarding reload for removed root {}", self.handle);
                    shared.settled.notify_waiters();
                    return;
                }

                shared.publish_loaded(&self.handle);
                shared.settled.notify_waiters();
            }

            if self.data().removed {
                return;
            }
        }
    }
}
