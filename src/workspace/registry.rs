//! Registry of active workspace roots
//!
//! Owns every [`RootState`], wires each one to its manifest watch and to
//! configuration changes, and fans out [`RegistryEvent`]s to subscribers.
//!
//! The registry keeps an epoch counter that is bumped on every
//! cache-relevant event (root added, removed, marked stale, reload
//! finished). Consumers that memoize derived views tag them with the epoch
//! observed before computing and treat a mismatch as invalidation.

use super::fs::{FileSystem, LocalFs};
use super::root::{RootHandle, RootSnapshot, RootState};
use super::watch::{ManifestWatcher, NotifyWatcher, WatchEvent, WatchGuard};
use crate::config::{ConfigChange, ConfigKey, Settings};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Notification delivered to registry subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A reload finished, whatever its outcome
    Loaded(RootHandle),
    /// A root was removed from the registry
    Removed(RootHandle),
}

impl RegistryEvent {
    pub fn root(&self) -> &RootHandle {
        match self {
            Self::Loaded(root) | Self::Removed(root) => root,
        }
    }
}

type Callback = Arc<dyn Fn(&RegistryEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// State shared between the registry and the per-root tasks
pub(crate) struct Shared {
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) settings: Arc<Settings>,
    pub(crate) epoch: AtomicU64,
    pub(crate) settled: Notify,
    subscribers: Mutex<Subscribers>,
}

impl Shared {
    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn publish(&self, event: &RegistryEvent) {
        let callbacks: Vec<Callback> = self.subscribers().callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub(crate) fn publish_loaded(&self, root: &RootHandle) {
        self.publish(&RegistryEvent::Loaded(root.clone()));
    }

    fn mark_stale(&self, state: &RootState) -> bool {
        let marked = state.mark_stale();
        if marked {
            self.bump_epoch();
        }
        marked
    }
}

/// Keeps a registry callback registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Stop receiving events
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.subscribers().callbacks.remove(&self.id);
        }
    }
}

struct RootEntry {
    state: Arc<RootState>,
    tasks: Vec<JoinHandle<()>>,
    _watch: Option<WatchGuard>,
}

impl Drop for RootEntry {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// The set of active workspace roots
pub struct RootRegistry {
    shared: Arc<Shared>,
    watcher: Arc<dyn ManifestWatcher>,
    roots: Mutex<HashMap<RootHandle, RootEntry>>,
}

impl RootRegistry {
    /// Create a registry with explicit filesystem and watcher backends
    pub fn new(
        settings: Arc<Settings>,
        fs: Arc<dyn FileSystem>,
        watcher: Arc<dyn ManifestWatcher>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                fs,
                settings,
                epoch: AtomicU64::new(0),
                settled: Notify::new(),
                subscribers: Mutex::new(Subscribers::default()),
            }),
            watcher,
            roots: Mutex::new(HashMap::new()),
        }
    }

    /// Registry reading local disk and watching with OS notifications
    pub fn local(settings: Arc<Settings>) -> Self {
        Self::new(settings, Arc::new(LocalFs), Arc::new(NotifyWatcher))
    }

    fn roots(&self) -> MutexGuard<'_, HashMap<RootHandle, RootEntry>> {
        self.roots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking a root and schedule its first load.
    ///
    /// Returns `false` if the root is already registered. Must be called
    /// from within a Tokio runtime.
    pub fn add_root(&self, handle: RootHandle) -> bool {
        let mut roots = self.roots();
        if roots.contains_key(&handle) {
            return false;
        }

        let state = Arc::new(RootState::new(handle.clone()));

        let (watch_tx, watch_rx) = mpsc::unbounded_channel();
        let watch = match self.watcher.watch(state.manifest_path(), watch_tx) {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!("{}; changes to {} will not be noticed", e, handle);
                None
            }
        };

        let config_rx = self.shared.settings.subscribe();
        let worker = tokio::spawn(Arc::clone(&state).run_reloads(Arc::clone(&self.shared)));
        let listener = tokio::spawn(listen(
            Arc::clone(&state),
            Arc::clone(&self.shared),
            watch_rx,
            config_rx,
        ));

        roots.insert(
            handle.clone(),
            RootEntry {
                state: Arc::clone(&state),
                tasks: vec![worker, listener],
                _watch: watch,
            },
        );
        self.shared.bump_epoch();
        drop(roots);

        state.schedule();
        info!("Workspace root [Added] \"{}\"", handle);
        true
    }

    /// Stop tracking a root.
    ///
    /// Any in-flight reload result for it is discarded. Subscribers receive
    /// [`RegistryEvent::Removed`]. Returns `false` if the root was unknown.
    pub fn remove_root(&self, handle: &RootHandle) -> bool {
        let entry = {
            let mut roots = self.roots();
            let Some(entry) = roots.remove(handle) else {
                return false;
            };
            entry.state.mark_removed();
            self.shared.bump_epoch();
            entry
        };
        drop(entry);

        self.shared.publish(&RegistryEvent::Removed(handle.clone()));
        self.shared.settled.notify_waiters();
        info!("Workspace root [Removed] \"{}\"", handle);
        true
    }

    /// Snapshot of every registered root, in no particular order
    pub fn list_roots(&self) -> Vec<RootSnapshot> {
        self.states().iter().map(|s| s.snapshot()).collect()
    }

    /// Snapshot of one root
    pub fn get(&self, handle: &RootHandle) -> Option<RootSnapshot> {
        self.roots().get(handle).map(|e| e.state.snapshot())
    }

    /// Snapshot of the root registered for a directory
    pub fn find_by_path(&self, path: &Path) -> Option<RootSnapshot> {
        self.states()
            .into_iter()
            .find(|s| s.handle().path() == path)
            .map(|s| s.snapshot())
    }

    pub fn contains(&self, handle: &RootHandle) -> bool {
        self.roots().contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.roots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots().is_empty()
    }

    /// True if any root owes a reload
    pub fn is_any_stale(&self) -> bool {
        self.roots().values().any(|e| e.state.is_stale())
    }

    /// Current epoch if no root is stale.
    ///
    /// Staleness is checked before the epoch is read, so a reload that
    /// finished in between is always reflected in the returned epoch.
    pub fn clean_epoch(&self) -> Option<u64> {
        if self.is_any_stale() {
            return None;
        }
        Some(self.epoch())
    }

    /// Counter bumped on every cache-relevant event
    pub fn epoch(&self) -> u64 {
        self.shared.epoch.load(Ordering::SeqCst)
    }

    /// Mark one root stale, scheduling a reload. Returns `false` if unknown.
    pub fn mark_stale(&self, handle: &RootHandle) -> bool {
        let state = self.roots().get(handle).map(|e| Arc::clone(&e.state));
        match state {
            Some(state) => self.shared.mark_stale(&state),
            None => false,
        }
    }

    /// Mark every root stale
    pub fn mark_all_stale(&self) {
        for state in self.states() {
            self.shared.mark_stale(&state);
        }
    }

    /// Register a callback for every load and removal.
    ///
    /// Callbacks run on the reload worker that produced the event and must
    /// not block.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self.shared.subscribers();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.callbacks.insert(id, Arc::new(callback));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Remove a subscription
    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers().callbacks.len()
    }

    /// Wait until no root is stale or reloading
    pub async fn settled(&self) {
        loop {
            let notified = self.shared.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let busy = self.states().iter().any(|s| s.is_busy());
            if !busy {
                return;
            }
            notified.await;
        }
    }

    fn states(&self) -> Vec<Arc<RootState>> {
        self.roots()
            .values()
            .map(|e| Arc::clone(&e.state))
            .collect()
    }
}

impl std::fmt::Debug for RootRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootRegistry")
            .field("roots", &self.len())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

/// Turn watch events and `enabled` changes for one root into stale marks
async fn listen(
    state: Arc<RootState>,
    shared: Arc<Shared>,
    mut watch: mpsc::UnboundedReceiver<WatchEvent>,
    mut config: broadcast::Receiver<ConfigChange>,
) {
    let mut watching = true;
    let mut configured = true;

    while watching || configured {
        tokio::select! {
            event = watch.recv(), if watching => match event {
                Some(event) => {
                    debug!("Workspace root [{}] \"{}\"", event, state.manifest_path().display());
                    shared.mark_stale(&state);
                }
                None => watching = false,
            },
            change = config.recv(), if configured => match change {
                Ok(change) => {
                    if change.affects(ConfigKey::Enabled, Some(state.handle().path())) {
                        debug!("Workspace root [Settings changed] \"{}\"", state.handle());
                        shared.mark_stale(&state);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Missed {} configuration changes, reloading {}", missed, state.handle());
                    shared.mark_stale(&state);
                }
                Err(RecvError::Closed) => configured = false,
            },
        }
    }
}
