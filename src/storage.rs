use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;

/// Durable per-client key/value storage for serialized blobs.
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    fn read(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn write(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// How a store's persisted blob was found at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Missing,
    Loaded,
    /// The blob did not parse; the store started empty and the original bytes
    /// were moved to `<key>.corrupt`.
    Recovered { reason: String },
}

#[derive(Debug, Clone)]
pub struct LocalFsBlobStore {
    base_dir: PathBuf,
}

impl LocalFsBlobStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl BlobStore for LocalFsBlobStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.blob_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read blob: {}", path.display())),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("create data dir: {}", self.base_dir.display()))?;

        let path = self.blob_path(key);
        let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
        std::fs::write(&tmp_path, bytes)
            .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
        if let Err(err) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err).with_context(|| format!("rename tmp to final: {}", path.display()));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.blob_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove blob: {}", path.display())),
        }
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    read_only: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `write`/`remove` fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self, key: &str) -> anyhow::Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            anyhow::bail!("storage is read-only: {key}");
        }
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("memory blob store lock poisoned"))
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.check_writable(key)?;
        self.lock()?.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.check_writable(key)?;
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Reads and parses the blob at `key`.
///
/// A blob that fails to parse is not an error: it is copied to `<key>.corrupt`
/// and reported as [`LoadStatus::Recovered`] with no value.
pub fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> anyhow::Result<(Option<T>, LoadStatus)> {
    let Some(bytes) = store.read(key)? else {
        return Ok((None, LoadStatus::Missing));
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok((Some(value), LoadStatus::Loaded)),
        Err(err) => {
            let reason = format!("parse {key}: {err}");
            tracing::warn!(key, error = %err, "stored blob is malformed; starting empty");

            let corrupt_key = format!("{key}.corrupt");
            if let Err(err) = store
                .write(&corrupt_key, &bytes)
                .and_then(|()| store.remove(key))
            {
                tracing::warn!(key, error = format!("{err:#}"), "quarantine malformed blob");
            }
            Ok((None, LoadStatus::Recovered { reason }))
        }
    }
}

pub fn save_json<T: serde::Serialize + ?Sized>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    store
        .write(key, &data)
        .with_context(|| format!("persist {key}"))
}
