use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use mpb_core::MediaFile;

use crate::store::{DirEntry, FileStore, StoredFile, file_name};

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    version: u64,
}

/// In-process store. Versions are a global write counter, so any write to a
/// path invalidates tokens read before it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, Blob>>,
    next_version: Mutex<u64>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file directly, bypassing existence checks.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let version = self.bump()?;
        self.lock()?.insert(
            path.to_string(),
            Blob {
                bytes: content.into(),
                version,
            },
        );
        Ok(())
    }

    /// Current text of a file, if present.
    pub fn contents(&self, path: &str) -> Option<String> {
        let files = self.files.lock().ok()?;
        files
            .get(path)
            .map(|blob| String::from_utf8_lossy(&blob.bytes).into_owned())
    }

    /// Raw bytes of a file, if present.
    pub fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().ok()?;
        files.get(path).map(|blob| blob.bytes.clone())
    }

    pub fn paths(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every subsequent write fail, as an unreachable backend would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Blob>>> {
        self.files.lock().map_err(|_| anyhow!("memory store poisoned"))
    }

    fn bump(&self) -> Result<u64> {
        let mut next = self
            .next_version
            .lock()
            .map_err(|_| anyhow!("memory store poisoned"))?;
        *next += 1;
        Ok(*next)
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            bail!("store is rejecting writes");
        }
        Ok(())
    }

    fn create(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        self.check_writable()?;
        let version = self.bump()?;
        let mut files = self.lock()?;
        if files.contains_key(path) {
            bail!("file already exists: {path}");
        }
        files.insert(path.to_string(), Blob { bytes, version });
        Ok(path.to_string())
    }

    fn check_version(
        files: &BTreeMap<String, Blob>,
        path: &str,
        original: &StoredFile,
    ) -> Result<()> {
        let current = files
            .get(path)
            .ok_or_else(|| anyhow!("file does not exist: {path}"))?;
        if current.version.to_string() != original.version {
            bail!(
                "stale version for {path}: have {}, current {}",
                original.version,
                current.version
            );
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn create_file(&self, path: &str, content: &str) -> Result<String> {
        self.create(path, content.as_bytes().to_vec())
    }

    async fn get_file(&self, path: &str) -> Result<Option<StoredFile>> {
        let files = self.lock()?;
        Ok(files.get(path).map(|blob| StoredFile {
            path: path.to_string(),
            content: String::from_utf8_lossy(&blob.bytes).into_owned(),
            version: blob.version.to_string(),
        }))
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        original: &StoredFile,
    ) -> Result<String> {
        self.check_writable()?;
        let version = self.bump()?;
        let mut files = self.lock()?;
        Self::check_version(&files, path, original)?;
        files.insert(
            path.to_string(),
            Blob {
                bytes: content.as_bytes().to_vec(),
                version,
            },
        );
        Ok(path.to_string())
    }

    async fn delete_file(&self, path: &str, original: &StoredFile) -> Result<()> {
        self.check_writable()?;
        let mut files = self.lock()?;
        Self::check_version(&files, path, original)?;
        files.remove(path);
        Ok(())
    }

    async fn get_directory(&self, path: &str) -> Result<Option<Vec<DirEntry>>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let files = self.lock()?;
        let entries: Vec<DirEntry> = files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(|rest| (key, rest)))
            .filter(|(_, rest)| !rest.contains('/'))
            .map(|(key, _)| DirEntry {
                name: file_name(key).to_string(),
                path: key.clone(),
            })
            .collect();
        Ok((!entries.is_empty()).then_some(entries))
    }

    async fn upload_media(&self, path: &str, file: &MediaFile) -> Result<String> {
        self.create(path, file.content.clone())
    }
}
