//! Error types for Companion
//!
//! All modules use `CompanionResult<T>` as their return type. Per-root
//! manifest failures never surface here; they are absorbed into
//! [`RootStatus`](crate::workspace::RootStatus).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Companion operations
pub type CompanionResult<T> = Result<T, CompanionError>;

/// All errors that can occur in Companion
#[derive(Error, Debug)]
pub enum CompanionError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Workspace errors
    #[error("Not a workspace root: {0}")]
    RootNotFound(PathBuf),

    #[error("No composer.json in workspace root {0}")]
    ManifestMissing(PathBuf),

    #[error("Invalid composer.json at {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Workspace root {path} is disabled in configuration")]
    RootDisabled { path: PathBuf },

    #[error("Failed to watch {path}: {reason}")]
    WatchSetup { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CompanionError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a watch setup error
    pub fn watch_setup(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WatchSetup {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ManifestMissing(_) => Some("Run: composer init".to_string()),
            Self::RootDisabled { path } => Some(format!(
                "Run: companion config set composer.enabled true --root {}",
                path.display()
            )),
            Self::ConfigInvalid { .. } => Some("Run: companion config init --force".to_string()),
            Self::WatchSetup { .. } => {
                Some("Check the inotify watch limit (fs.inotify.max_user_watches)".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CompanionError::ManifestMissing(PathBuf::from("/work/app"));
        assert!(err.to_string().contains("No composer.json"));
        assert!(err.to_string().contains("/work/app"));
    }

    #[test]
    fn error_hint() {
        let err = CompanionError::ManifestMissing(PathBuf::from("/work/app"));
        assert_eq!(err.hint().as_deref(), Some("Run: composer init"));
        assert!(CompanionError::User("x".into()).hint().is_none());
    }

    #[test]
    fn disabled_hint_names_root() {
        let err = CompanionError::RootDisabled {
            path: PathBuf::from("/work/legacy"),
        };
        assert_eq!(
            err.hint().as_deref(),
            Some("Run: companion config set composer.enabled true --root /work/legacy")
        );
    }

    #[test]
    fn io_context() {
        let err = CompanionError::io(
            "reading composer.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error: reading composer.json");
    }
}
