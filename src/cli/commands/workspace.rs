//! Registry setup shared by the commands

use crate::catalog::CatalogCache;
use crate::config::Settings;
use crate::error::{CompanionError, CompanionResult};
use crate::workspace::{RootHandle, RootRegistry, RootSnapshot, RootStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Registry and catalog over the roots named on the command line
pub struct Workspace {
    pub registry: Arc<RootRegistry>,
    pub catalog: CatalogCache,
    pub roots: Vec<RootHandle>,
}

impl Workspace {
    /// Empty workspace backed by the local filesystem
    pub fn new(settings: Arc<Settings>) -> Self {
        let registry = Arc::new(RootRegistry::local(settings));
        let catalog = CatalogCache::new(Arc::clone(&registry));
        Self {
            registry,
            catalog,
            roots: Vec::new(),
        }
    }

    /// Open `paths` and wait until every root finished its first load
    pub async fn open(paths: &[PathBuf], settings: Arc<Settings>) -> CompanionResult<Self> {
        let mut workspace = Self::new(settings);
        workspace.add_roots(paths).await?;
        workspace.registry.settled().await;
        Ok(workspace)
    }

    /// Register `paths`, or the current directory if empty
    pub async fn add_roots(&mut self, paths: &[PathBuf]) -> CompanionResult<()> {
        for dir in resolve_roots(paths).await? {
            if self.roots.iter().any(|r| r.path() == dir) {
                debug!("Skipping duplicate root {}", dir.display());
                continue;
            }
            let handle = RootHandle::new(dir);
            self.registry.add_root(handle.clone());
            self.roots.push(handle);
        }
        Ok(())
    }

    /// Snapshots in command-line order
    pub fn snapshots(&self) -> Vec<RootSnapshot> {
        self.roots
            .iter()
            .filter_map(|h| self.registry.get(h))
            .collect()
    }

    /// Fail if a single root was requested and it did not load
    pub fn require_single_loaded(&self) -> CompanionResult<()> {
        match self.snapshots().as_slice() {
            [only] => require_loaded(only),
            _ => Ok(()),
        }
    }
}

/// Turn a non-loaded root into the error explaining why
pub fn require_loaded(snapshot: &RootSnapshot) -> CompanionResult<()> {
    let path = snapshot.handle.path().to_path_buf();
    match snapshot.status {
        RootStatus::Loaded => Ok(()),
        RootStatus::Missing => Err(CompanionError::ManifestMissing(path)),
        RootStatus::Disabled => Err(CompanionError::RootDisabled { path }),
        RootStatus::Error => Err(CompanionError::ManifestParse {
            path: snapshot.manifest_path.clone(),
            reason: snapshot
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        }),
        RootStatus::Unloaded | RootStatus::Loading => Err(CompanionError::Internal(format!(
            "root {} has not finished loading",
            path.display()
        ))),
    }
}

/// Canonical directories for `paths`, defaulting to the current directory
pub async fn resolve_roots(paths: &[PathBuf]) -> CompanionResult<Vec<PathBuf>> {
    if paths.is_empty() {
        let cwd = std::env::current_dir()
            .map_err(|e| CompanionError::io("getting current directory", e))?;
        return Ok(vec![cwd]);
    }

    let mut dirs = Vec::with_capacity(paths.len());
    for path in paths {
        let dir = fs::canonicalize(path)
            .await
            .map_err(|_| CompanionError::RootNotFound(path.clone()))?;
        if !dir.is_dir() {
            return Err(CompanionError::RootNotFound(path.clone()));
        }
        dirs.push(dir);
    }
    Ok(dirs)
}
