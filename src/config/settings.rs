//! Live settings with change notifications
//!
//! [`Settings`] owns the current [`Config`] and broadcasts a
//! [`ConfigChange`] for every key that differs when the configuration is
//! replaced. Workspace roots listen for `enabled` changes scoped to their
//! own directory.

use super::schema::Config;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Configuration keys that can change at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// `composer.enabled` or `roots.<dir>.enabled`
    Enabled,
    /// `composer.executable` or `roots.<dir>.executable`
    Executable,
    /// `composer.show_scripts`
    ShowScripts,
    /// `php.executable`
    PhpExecutable,
    /// `general.log_format`
    LogFormat,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enabled => "enabled",
            Self::Executable => "executable",
            Self::ShowScripts => "show_scripts",
            Self::PhpExecutable => "php.executable",
            Self::LogFormat => "log_format",
        };
        write!(f, "{}", name)
    }
}

/// A single configuration change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    /// Which key changed
    pub key: ConfigKey,
    /// Root directory the change is scoped to, `None` for global keys
    pub scope: Option<PathBuf>,
}

impl ConfigChange {
    /// Whether this change affects `key` for `root`.
    ///
    /// Global changes affect every root. A scoped change only affects its
    /// own root, or any query that does not name a root.
    pub fn affects(&self, key: ConfigKey, root: Option<&Path>) -> bool {
        if self.key != key {
            return false;
        }
        match (&self.scope, root) {
            (None, _) | (Some(_), None) => true,
            (Some(scope), Some(root)) => scope == root,
        }
    }
}

/// Shared, observable configuration
pub struct Settings {
    config: RwLock<Config>,
    changes: broadcast::Sender<ConfigChange>,
}

impl Settings {
    /// Wrap an initial configuration
    pub fn new(config: Config) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            config: RwLock::new(config),
            changes,
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether manifest loading is enabled for a root
    pub fn enabled_for(&self, root: &Path) -> bool {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .enabled_for(root)
    }

    /// Receive future configuration changes
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.changes.subscribe()
    }

    /// Replace the configuration and broadcast what changed
    pub fn replace(&self, config: Config) -> Vec<ConfigChange> {
        let changes = {
            let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
            let changes = diff(&current, &config);
            *current = config;
            changes
        };
        self.publish(&changes);
        changes
    }

    /// Enable or disable manifest loading for a single root
    pub fn set_root_enabled(&self, root: &Path, enabled: bool) -> Vec<ConfigChange> {
        let mut config = self.snapshot();
        config.root_mut(root).enabled = Some(enabled);
        self.replace(config)
    }

    fn publish(&self, changes: &[ConfigChange]) {
        for change in changes {
            debug!(
                "Setting {} changed for {}",
                change.key,
                change
                    .scope
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "workspace".to_string())
            );
            // No receivers is fine: nothing is listening yet
            let _ = self.changes.send(change.clone());
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn diff(old: &Config, new: &Config) -> Vec<ConfigChange> {
    let mut changes = Vec::new();
    let mut global = |key, changed: bool| {
        if changed {
            changes.push(ConfigChange { key, scope: None });
        }
    };

    global(ConfigKey::LogFormat, old.general.log_format != new.general.log_format);
    global(ConfigKey::Enabled, old.composer.enabled != new.composer.enabled);
    global(
        ConfigKey::Executable,
        old.composer.executable != new.composer.executable,
    );
    global(
        ConfigKey::ShowScripts,
        old.composer.show_scripts != new.composer.show_scripts,
    );
    global(ConfigKey::PhpExecutable, old.php.executable != new.php.executable);

    let dirs: BTreeSet<&String> = old.roots.keys().chain(new.roots.keys()).collect();
    for dir in dirs {
        let before = old.roots.get(dir).cloned().unwrap_or_default();
        let after = new.roots.get(dir).cloned().unwrap_or_default();
        let scope = Some(PathBuf::from(dir));
        if before.enabled != after.enabled {
            changes.push(ConfigChange {
                key: ConfigKey::Enabled,
                scope: scope.clone(),
            });
        }
        if before.executable != after.executable {
            changes.push(ConfigChange {
                key: ConfigKey::Executable,
                scope,
            });
        }
    }

    changes
}
