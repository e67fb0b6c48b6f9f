//! Task catalog over all loaded workspace roots

pub mod cache;
pub mod task;

pub use cache::{CatalogCache, CatalogEntry};
pub use task::{quote_path, resolve_executable, TaskCommand, TaskGroup};
