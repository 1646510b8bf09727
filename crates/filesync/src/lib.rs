//! File synchronization between local storage and the remote file servers.
//!
//! Upload-time categories and download-time expectations drift: a caller
//! may only hold a bare filename, or a path recorded with a different
//! separator convention. [`StoragePath`] absorbs separator drift at parse
//! time; [`FileSyncClient::download`] absorbs the rest by walking a
//! fallback list of path variants, one full round trip each, until the
//! server answers 200.

mod client;
mod error;

pub use client::{candidate_paths, FileSyncClient};
pub use error::SyncError;

use std::path::Path;

use async_trait::async_trait;
use mirage_core::path::StoragePath;

/// Seam for components that move files to and from a remote file server.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Upload a local file into a category bucket. The server assigns a
    /// collision-free name; the returned path is where it landed.
    async fn upload(&self, local: &Path, category: &str) -> Result<StoragePath, SyncError>;

    /// Download a remote file to `local`, creating parent directories.
    async fn download(&self, remote: &StoragePath, local: &Path) -> Result<(), SyncError>;
}
