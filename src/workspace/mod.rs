//! Live cache of Composer manifests across workspace roots
//!
//! Each root is tracked by a state machine in [`root`] with its own reload worker.
//! Reloads are triggered only by marking a root stale, which happens when
//! the root is added, when its `composer.json` is created, modified or
//! deleted, and when its `enabled` setting changes.
//!
//! # Root States
//!
//! | Status | Scripts / deps | Description |
//! |--------|----------------|-------------|
//! | Unloaded | empty | Added, first load not started |
//! | Loading | empty | Reload in flight |
//! | Loaded | populated | Manifest parsed |
//! | Disabled | empty | Turned off in configuration |
//! | Missing | empty | No `composer.json` |
//! | Error | empty | Unreadable or malformed manifest |

pub mod fs;
pub mod registry;
pub mod root;
pub mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use fs::{FileSystem, LocalFs};
pub use registry::{RegistryEvent, RootRegistry, Subscription};
pub use root::{RootHandle, RootSnapshot, RootStatus};
pub use watch::{ManifestWatcher, NotifyWatcher, WatchEvent, WatchGuard, WatchSender};
