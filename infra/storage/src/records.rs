//! Durable record storage keyed by a numeric identifier.

use crate::error::{StorageError, StorageErrorExt};
use crate::fs::{self, Compression};
use crate::security;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// File extension for record files on disk.
const RECORD_SUFFIX: &str = ".rec";

/// The durable key-value contract for business records.
///
/// Keys are dense numeric identifiers handed out by [`KvStore::next_id`];
/// values are opaque encoded bytes. `list` returns values in ascending key
/// order.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Stores (or replaces) the record under `id`.
    async fn put(&self, id: u64, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Fetches the record under `id`, if present.
    async fn get(&self, id: u64) -> Result<Option<Vec<u8>>, StorageError>;

    /// Removes the record under `id`.
    ///
    /// # Errors
    /// Returns [`StorageError::RecordNotFound`] when no such record exists.
    async fn delete(&self, id: u64) -> Result<(), StorageError>;

    /// Returns every record in ascending id order.
    async fn list(&self) -> Result<Vec<Vec<u8>>, StorageError>;

    /// Hands out the next free identifier, starting at 1.
    fn next_id(&self) -> u64;
}

// --- Typed wrapper ---

/// Typed view over a [`KvStore`], encoding records with `postcard`.
pub struct Records<T> {
    kv: Arc<dyn KvStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self { kv: Arc::clone(&self.kv), _marker: PhantomData }
    }
}

impl<T> std::fmt::Debug for Records<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Records").field("kv", &self.kv).finish()
    }
}

impl<T> Records<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Wraps a key-value store with a typed codec.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv, _marker: PhantomData }
    }

    /// Hands out the next free identifier.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.kv.next_id()
    }

    /// Encodes and stores a record under `id`.
    ///
    /// # Errors
    /// Returns [`StorageError::Codec`] if encoding fails, or any engine
    /// error from the underlying store.
    pub async fn put(&self, id: u64, record: &T) -> Result<(), StorageError> {
        let bytes = postcard::to_stdvec(record).context("Record encoding failed")?;
        self.kv.put(id, bytes).await
    }

    /// Fetches and decodes the record under `id`, if present.
    ///
    /// # Errors
    /// Returns [`StorageError::Codec`] if stored bytes cannot be decoded.
    pub async fn get(&self, id: u64) -> Result<Option<T>, StorageError> {
        match self.kv.get(id).await? {
            Some(bytes) => {
                let record = postcard::from_bytes(&bytes).context("Record decoding failed")?;
                Ok(Some(record))
            },
            None => Ok(None),
        }
    }

    /// Removes the record under `id`.
    ///
    /// # Errors
    /// Returns [`StorageError::RecordNotFound`] when no such record exists.
    pub async fn delete(&self, id: u64) -> Result<(), StorageError> {
        self.kv.delete(id).await
    }

    /// Returns every record in ascending id order.
    ///
    /// # Errors
    /// Returns [`StorageError::Codec`] if any stored record fails to decode.
    pub async fn list(&self) -> Result<Vec<T>, StorageError> {
        self.kv
            .list()
            .await?
            .iter()
            .map(|bytes| postcard::from_bytes(bytes).context("Record decoding failed"))
            .collect()
    }
}

// --- In-memory engine ---

/// An in-memory record store for tests and keyless development setups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<u64, Vec<u8>>>,
    seq: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store with the id sequence at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, id: u64, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.records.write().insert(id, bytes);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        if self.records.write().remove(&id).is_none() {
            return Err(StorageError::RecordNotFound {
                message: format!("No record with id {id}").into(),
                context: None,
            });
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn next_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// --- Filesystem engine ---

/// Configuration for a disk-backed record store.
#[must_use = "The store is not initialized until you call .connect()"]
#[derive(Debug)]
pub struct FsStoreBuilder {
    root: PathBuf,
    compression: Compression,
}

impl FsStoreBuilder {
    /// Toggles transparent LZ4 compression for record files.
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Consumes the configuration and initializes the store.
    ///
    /// Boot sequence: create and canonicalize the root, purge stale temp
    /// files, then recover the id sequence by scanning existing record
    /// files so restarts never reissue an identifier.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the root cannot be created or
    /// resolved.
    pub async fn connect(self) -> Result<FsStore, StorageError> {
        let canonical = fs::bootstrap_root(&self.root).await?;
        fs::purge_tmp(&canonical).await;

        let highest = highest_record_id(&canonical).await?;
        info!(path = %canonical.display(), highest, "Record store connected");

        Ok(FsStore {
            inner: Arc::new(FsStoreInner {
                root: canonical,
                compression: self.compression,
                tmp_counter: AtomicU64::new(1),
                seq: AtomicU64::new(highest),
            }),
        })
    }
}

#[derive(Debug)]
struct FsStoreInner {
    root: PathBuf,
    compression: Compression,
    tmp_counter: AtomicU64,
    seq: AtomicU64,
}

/// A disk-backed record store: one atomic file per record inside a
/// sandboxed root.
#[derive(Debug, Clone)]
pub struct FsStore {
    inner: Arc<FsStoreInner>,
}

impl FsStore {
    /// Returns a builder for a store rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> FsStoreBuilder {
        FsStoreBuilder { root: root.into(), compression: Compression::None }
    }

    fn resolve(&self, id: u64) -> Result<PathBuf, StorageError> {
        security::resolve_key(&self.inner.root, record_name(id))
    }
}

#[async_trait]
impl KvStore for FsStore {
    async fn put(&self, id: u64, bytes: Vec<u8>) -> Result<(), StorageError> {
        let resolved = self.resolve(id)?;
        let packed = self.inner.compression.compress(&bytes);
        fs::write_atomic(&resolved, &packed, &self.inner.tmp_counter).await
    }

    async fn get(&self, id: u64) -> Result<Option<Vec<u8>>, StorageError> {
        let resolved = self.resolve(id)?;
        match fs::read_file(&resolved).await? {
            Some(packed) => Ok(Some(self.inner.compression.decompress(&packed)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        let resolved = self.resolve(id)?;
        if !fs::remove_file(&resolved).await? {
            return Err(StorageError::RecordNotFound {
                message: format!("No record with id {id}").into(),
                context: None,
            });
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        let mut ids = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.inner.root)
            .await
            .context("Failed to scan record root")?;

        while let Some(entry) =
            dir.next_entry().await.context("Failed to scan record root")?
        {
            if let Some(id) = parse_record_id(&entry.file_name().to_string_lossy()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            // A record deleted mid-scan is simply skipped.
            if let Some(bytes) = self.get(id).await? {
                records.push(bytes);
            }
        }
        Ok(records)
    }

    fn next_id(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn record_name(id: u64) -> String {
    format!("{id:020}{RECORD_SUFFIX}")
}

fn parse_record_id(file_name: &str) -> Option<u64> {
    file_name.strip_suffix(RECORD_SUFFIX)?.parse().ok()
}

async fn highest_record_id(root: &Path) -> Result<u64, StorageError> {
    let mut highest = 0;
    let mut dir = tokio::fs::read_dir(root).await.context("Failed to scan record root")?;

    while let Some(entry) = dir.next_entry().await.context("Failed to scan record root")? {
        if let Some(id) = parse_record_id(&entry.file_name().to_string_lossy()) {
            highest = highest.max(id);
        }
    }
    Ok(highest)
}
