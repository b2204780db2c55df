use anyhow::Result;
use async_trait::async_trait;
use mpb_core::MediaFile;
use serde::{Deserialize, Serialize};

/// A file read from the store, with the version token captured at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub path: String,
    pub content: String,
    /// Opaque token; writes passing a stale token must fail.
    pub version: String,
}

/// One file in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
}

/// Versioned, path-keyed content storage.
///
/// Paths are relative, `/`-separated, and never start with `/`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create a new file. Fails if the path already exists.
    async fn create_file(&self, path: &str, content: &str) -> Result<String>;

    /// Read a file. `Ok(None)` when the path does not exist.
    async fn get_file(&self, path: &str) -> Result<Option<StoredFile>>;

    /// Overwrite a file previously read as `original`. Fails if the file
    /// changed since (`original.version` is stale) or no longer exists.
    async fn update_file(&self, path: &str, content: &str, original: &StoredFile)
    -> Result<String>;

    /// Remove a file previously read as `original`, under the same version check.
    async fn delete_file(&self, path: &str, original: &StoredFile) -> Result<()>;

    /// List the files directly inside `path`. `Ok(None)` when the directory is absent.
    async fn get_directory(&self, path: &str) -> Result<Option<Vec<DirEntry>>>;

    /// Store an uploaded binary file. Fails if the path already exists.
    async fn upload_media(&self, path: &str, file: &MediaFile) -> Result<String>;
}

/// Last path segment.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
