// ============================================================
// BLOB STORAGE
// ============================================================
// Flat key/value byte stores for uploads and rendered charts

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::error::{AppError, Result};

/// Byte store keyed by flat file names. Implementations must be safe to
/// share across request handlers; no coordination is promised beyond what
/// the backing medium gives (concurrent puts to one key race, last write
/// wins).
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Vec<u8>>;
    fn exists(&self, key: &str) -> bool;
}

/// Directory-backed store; each key is one file directly under the root.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.blob_path(key)?;
        fs::write(&path, bytes)
            .map_err(|e| AppError::IoError(format!("failed to write {}: {}", path.display(), e)))
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(key)?;
        if !path.exists() {
            return Err(AppError::NotFound(format!("no blob named {}", key)));
        }
        fs::read(&path)
            .map_err(|e| AppError::IoError(format!("failed to read {}: {}", path.display(), e)))
    }

    fn exists(&self, key: &str) -> bool {
        self.blob_path(key).map(|p| p.exists()).unwrap_or(false)
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no blob named {}", key)))
    }

    fn exists(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }
}

/// Keys must be bare file names, never paths.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." || key.contains('/') || key.contains('\\') {
        return Err(AppError::Internal(format!("invalid blob key: {:?}", key)));
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| AppError::IoError(format!("failed to create dir {}: {}", path.display(), e)))
}
