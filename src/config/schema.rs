//! Configuration schema for Companion
//!
//! Configuration is stored at `~/.config/companion/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Composer integration settings
    pub composer: ComposerConfig,

    /// PHP interpreter settings (used to run `.phar` executables on Windows)
    pub php: PhpConfig,

    /// Per-root overrides keyed by the root directory path
    pub roots: BTreeMap<String, RootConfig>,
}

impl Config {
    /// Overrides for a workspace root, if any
    pub fn root(&self, root: &Path) -> Option<&RootConfig> {
        self.roots.get(root.to_string_lossy().as_ref())
    }

    /// Whether manifest loading is enabled for a root
    pub fn enabled_for(&self, root: &Path) -> bool {
        self.root(root)
            .and_then(|r| r.enabled)
            .unwrap_or(self.composer.enabled)
    }

    /// Configured executable for a root, falling back to the global one
    pub fn executable_for(&self, root: Option<&Path>) -> Option<&str> {
        root.and_then(|r| self.root(r))
            .and_then(|r| r.executable.as_deref())
            .or(self.composer.executable.as_deref())
    }

    /// Mutable overrides for a root, created on first use
    pub fn root_mut(&mut self, root: &Path) -> &mut RootConfig {
        self.roots
            .entry(root.to_string_lossy().into_owned())
            .or_default()
    }
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Composer integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Load manifests for workspace roots (default: true)
    pub enabled: bool,

    /// Path to the composer executable (default: `composer` on PATH)
    pub executable: Option<String>,

    /// Show per-root script lists
    pub show_scripts: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            show_scripts: true,
        }
    }
}

/// PHP interpreter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpConfig {
    /// Path to the php executable
    pub executable: Option<String>,
}

/// Per-root overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Override `composer.enabled` for this root
    pub enabled: Option<bool>,

    /// Override `composer.executable` for this root
    pub executable: Option<String>,
}
