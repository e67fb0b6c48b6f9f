//! Test doubles for the workspace registry

use super::fs::FileSystem;
use super::registry::{RegistryEvent, RootRegistry, Subscription};
use super::watch::{ManifestWatcher, WatchEvent, WatchGuard, WatchSender};
use crate::error::{CompanionError, CompanionResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Semaphore};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory filesystem. When gated, every read waits for a permit
/// handed out by [`MemoryFs::release`].
pub(crate) struct MemoryFs {
    files: Mutex<HashMap<PathBuf, Result<Vec<u8>, io::ErrorKind>>>,
    gate: Option<Semaphore>,
    started: watch::Sender<usize>,
    reads: AtomicUsize,
}

impl MemoryFs {
    pub(crate) fn new() -> Self {
        Self::build(None)
    }

    pub(crate) fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            gate,
            started: watch::channel(0).0,
            reads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn write(&self, path: impl Into<PathBuf>, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), Ok(contents.as_bytes().to_vec()));
    }

    pub(crate) fn remove(&self, path: &Path) {
        self.files.lock().unwrap().remove(path);
    }

    pub(crate) fn fail(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.files.lock().unwrap().insert(path.into(), Err(kind));
    }

    /// Let `n` gated reads proceed
    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Reads started so far
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` reads have started
    pub(crate) async fn wait_for_reads(&self, n: usize) {
        let mut rx = self.started.subscribe();
        tokio::time::timeout(EVENT_TIMEOUT, rx.wait_for(|count| *count >= n))
            .await
            .expect("timed out waiting for reads")
            .expect("read counter closed");
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let count = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        self.started.send_replace(count);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
                .forget();
        }

        match self.files.lock().unwrap().get(path) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(kind)) => Err(io::Error::new(*kind, "injected failure")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

type Watches = Arc<Mutex<HashMap<PathBuf, WatchSender>>>;

/// Watcher whose events are fired by the test
pub(crate) struct ManualWatcher {
    watches: Watches,
    failing: bool,
}

struct ManualGuard {
    path: PathBuf,
    watches: Watches,
}

impl Drop for ManualGuard {
    fn drop(&mut self) {
        self.watches.lock().unwrap().remove(&self.path);
    }
}

impl ManualWatcher {
    pub(crate) fn new() -> Self {
        Self {
            watches: Arc::default(),
            failing: false,
        }
    }

    /// Every watch request fails
    pub(crate) fn failing() -> Self {
        Self {
            watches: Arc::default(),
            failing: true,
        }
    }

    pub(crate) fn fire(&self, path: &Path, event: WatchEvent) {
        let watches = self.watches.lock().unwrap();
        let tx = watches.get(path).expect("path is not watched");
        tx.send(event).expect("watch receiver dropped");
    }

    pub(crate) fn is_watching(&self, path: &Path) -> bool {
        self.watches.lock().unwrap().contains_key(path)
    }
}

impl ManifestWatcher for ManualWatcher {
    fn watch(&self, path: &Path, events: WatchSender) -> CompanionResult<WatchGuard> {
        if self.failing {
            return Err(CompanionError::watch_setup(path, "watch limit reached"));
        }
        self.watches
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), events);
        Ok(WatchGuard::new(ManualGuard {
            path: path.to_path_buf(),
            watches: Arc::clone(&self.watches),
        }))
    }
}

/// Subscribe and forward every event into a channel
pub(crate) fn collect_events(
    registry: &RootRegistry,
) -> (Subscription, mpsc::UnboundedReceiver<RegistryEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = registry.subscribe(move |event| {
        let _ = tx.send(event.clone());
    });
    (subscription, rx)
}

pub(crate) async fn next_event(rx: &mut mpsc::UnboundedReceiver<RegistryEvent>) -> RegistryEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for registry event")
        .expect("event channel closed")
}
