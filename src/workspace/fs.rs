//! Filesystem access for manifest reads

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Reads manifest bytes for a workspace root.
///
/// A missing file must be reported as [`io::ErrorKind::NotFound`]; every
/// other error marks the root as failed.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Local disk through `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
