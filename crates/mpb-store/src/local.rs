use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use mpb_core::MediaFile;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::store::{DirEntry, FileStore, StoredFile};

/// Store backed by a working copy on disk.
///
/// The version token is the SHA-256 of the file's bytes, so a write fails if
/// anything changed the file between read and write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path under the root, refusing anything that escapes it.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
        {
            bail!("invalid store path: '{path}'");
        }
        Ok(self.root.join(relative))
    }

    async fn write_new(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if fs::try_exists(&target).await.unwrap_or(false) {
            bail!("file already exists: {path}");
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create dir: {}", parent.display()))?;
        }
        fs::write(&target, bytes)
            .await
            .with_context(|| format!("failed to write {}", target.display()))?;
        debug!(path, bytes = bytes.len(), "created file");
        Ok(path.to_string())
    }

    async fn check_version(&self, target: &Path, path: &str, original: &StoredFile) -> Result<()> {
        let current = fs::read(target)
            .await
            .with_context(|| format!("failed to read {}", target.display()))?;
        let current_version = version_of(&current);
        if current_version != original.version {
            bail!("stale version for {path}");
        }
        Ok(())
    }
}

fn version_of(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[async_trait]
impl FileStore for LocalStore {
    async fn create_file(&self, path: &str, content: &str) -> Result<String> {
        self.write_new(path, content.as_bytes()).await
    }

    async fn get_file(&self, path: &str) -> Result<Option<StoredFile>> {
        let target = self.resolve(path)?;
        let bytes = match fs::read(&target).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", target.display()));
            }
        };
        Ok(Some(StoredFile {
            path: path.to_string(),
            version: version_of(&bytes),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        }))
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        original: &StoredFile,
    ) -> Result<String> {
        let target = self.resolve(path)?;
        self.check_version(&target, path, original).await?;

        let tmp = target.with_extension("md.tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &target)
            .await
            .with_context(|| format!("failed to replace {}", target.display()))?;
        debug!(path, "updated file");
        Ok(path.to_string())
    }

    async fn delete_file(&self, path: &str, original: &StoredFile) -> Result<()> {
        let target = self.resolve(path)?;
        self.check_version(&target, path, original).await?;
        fs::remove_file(&target)
            .await
            .with_context(|| format!("failed to remove {}", target.display()))?;
        debug!(path, "deleted file");
        Ok(())
    }

    async fn get_directory(&self, path: &str) -> Result<Option<Vec<DirEntry>>> {
        let target = self.resolve(path.trim_end_matches('/'))?;
        let mut dir = match fs::read_dir(&target).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list {}", target.display()));
            }
        };

        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            if !item.file_type().await?.is_file() {
                continue;
            }
            let name = item.file_name().to_string_lossy().into_owned();
            entries.push(DirEntry {
                path: format!("{}/{}", path.trim_end_matches('/'), name),
                name,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }

    async fn upload_media(&self, path: &str, file: &MediaFile) -> Result<String> {
        self.write_new(path, &file.content).await
    }
}
