//! Manifest change watching
//!
//! A watch is scoped to one manifest path. The manifest may not exist yet,
//! so [`NotifyWatcher`] watches the parent directory non-recursively and
//! forwards only events for the manifest's file name.

use crate::error::{CompanionError, CompanionResult};
use notify::event::EventKind;
use notify::{RecursiveMode, Watcher};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Change observed on a watched manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        write!(f, "{}", name)
    }
}

/// Where a watch delivers its events
pub type WatchSender = mpsc::UnboundedSender<WatchEvent>;

/// Keeps a watch alive; dropping it releases the subscription
pub struct WatchGuard {
    _inner: Box<dyn Send>,
}

impl WatchGuard {
    /// Tie a watch to the lifetime of `inner`
    pub fn new(inner: impl Send + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard").finish_non_exhaustive()
    }
}

/// Creates change subscriptions for manifest files
pub trait ManifestWatcher: Send + Sync {
    /// Start watching `path`, delivering events to `events` until the
    /// returned guard is dropped
    fn watch(&self, path: &Path, events: WatchSender) -> CompanionResult<WatchGuard>;
}

/// OS-backed watcher using `notify`
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl ManifestWatcher for NotifyWatcher {
    fn watch(&self, path: &Path, events: WatchSender) -> CompanionResult<WatchGuard> {
        let dir = path
            .parent()
            .ok_or_else(|| CompanionError::watch_setup(path, "path has no parent directory"))?;
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| CompanionError::watch_setup(path, "path has no file name"))?
            .to_os_string();
        let shown = path.display().to_string();

        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if !ours {
                        return;
                    }
                    if let Some(kind) = classify(&event.kind) {
                        debug!("Watch event [{}] {}", kind, shown);
                        // Receiver gone means the root was removed
                        let _ = events.send(kind);
                    }
                }
                Err(e) => warn!("Watch error for {}: {}", shown, e),
            },
        )
        .map_err(|e| CompanionError::watch_setup(path, e))?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| CompanionError::watch_setup(path, e))?;

        Ok(WatchGuard::new(watcher))
    }
}

fn classify(kind: &EventKind) -> Option<WatchEvent> {
    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created),
        EventKind::Modify(_) => Some(WatchEvent::Modified),
        EventKind::Remove(_) => Some(WatchEvent::Deleted),
        _ => None,
    }
}
