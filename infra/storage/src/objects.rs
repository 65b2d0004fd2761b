//! Binary object storage for uploaded files.

use crate::error::{StorageError, StorageErrorExt};
use crate::fs;
use crate::security;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing::info;

/// Sidecar suffix holding per-object metadata on disk.
const META_SUFFIX: &str = ".meta";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object fetched from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object metadata without the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub size: u64,
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
}

/// The binary object-storage contract.
///
/// Keys are relative, slash-separated paths (`proofs/169..._x1y2.png`);
/// `put` returns the public URL under which the object will be served.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Stores an object and returns its public URL.
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Fetches an object.
    ///
    /// # Errors
    /// Returns [`StorageError::ObjectNotFound`] when the key is absent.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Fetches object metadata without the payload.
    ///
    /// # Errors
    /// Returns [`StorageError::ObjectNotFound`] when the key is absent.
    async fn head(&self, key: &str) -> Result<ObjectInfo, StorageError>;

    /// Removes an object.
    ///
    /// # Errors
    /// Returns [`StorageError::ObjectNotFound`] when the key is absent.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Builds the public URL for a key without touching storage.
    fn url(&self, key: &str) -> String;
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

fn object_not_found(key: &str) -> StorageError {
    StorageError::ObjectNotFound { message: key.to_owned().into(), context: None }
}

// --- In-memory engine ---

/// An in-memory object store for tests and keyless development setups.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    base_url: String,
}

impl MemoryObjectStore {
    /// Creates an empty store serving URLs under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { objects: RwLock::new(HashMap::new()), base_url: base_url.into() }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        security::ensure_safe_key(key)?;
        self.objects.write().insert(
            key.to_owned(),
            StoredObject { bytes: bytes.to_vec(), content_type: content_type.to_owned() },
        );
        Ok(self.url(key))
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        security::ensure_safe_key(key)?;
        self.objects.read().get(key).cloned().ok_or_else(|| object_not_found(key))
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo, StorageError> {
        let object = self.get(key).await?;
        Ok(ObjectInfo { size: object.bytes.len() as u64, content_type: object.content_type })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        security::ensure_safe_key(key)?;
        self.objects.write().remove(key).map(|_| ()).ok_or_else(|| object_not_found(key))
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }
}

// --- Filesystem engine ---

/// Configuration for a disk-backed object store.
#[must_use = "The store is not initialized until you call .connect()"]
#[derive(Debug)]
pub struct FsObjectStoreBuilder {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStoreBuilder {
    /// Sets the public base URL prepended to object keys.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Consumes the configuration and initializes the store.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the root cannot be created or
    /// resolved.
    pub async fn connect(self) -> Result<FsObjectStore, StorageError> {
        let canonical = fs::bootstrap_root(&self.root).await?;
        fs::purge_tmp(&canonical).await;
        info!(path = %canonical.display(), "Object store connected");

        Ok(FsObjectStore {
            inner: Arc::new(FsObjectStoreInner {
                root: canonical,
                base_url: self.base_url,
                tmp_counter: AtomicU64::new(1),
            }),
        })
    }
}

#[derive(Debug)]
struct FsObjectStoreInner {
    root: PathBuf,
    base_url: String,
    tmp_counter: AtomicU64,
}

/// A disk-backed object store: object bytes plus a metadata sidecar per
/// key, inside a sandboxed root.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    inner: Arc<FsObjectStoreInner>,
}

impl FsObjectStore {
    /// Returns a builder for a store rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> FsObjectStoreBuilder {
        FsObjectStoreBuilder { root: root.into(), base_url: String::new() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        security::resolve_key(&self.inner.root, key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let resolved = self.resolve(key)?;
        let meta_path = self.resolve(&format!("{key}{META_SUFFIX}"))?;

        fs::write_atomic(&resolved, bytes, &self.inner.tmp_counter).await?;

        let meta = ObjectMeta { content_type: content_type.to_owned() };
        let encoded = postcard::to_stdvec(&meta).context("Object metadata encoding failed")?;
        fs::write_atomic(&meta_path, &encoded, &self.inner.tmp_counter).await?;

        Ok(self.url(key))
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let resolved = self.resolve(key)?;
        let bytes = fs::read_file(&resolved).await?.ok_or_else(|| object_not_found(key))?;

        Ok(StoredObject { bytes, content_type: self.content_type_of(key).await? })
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo, StorageError> {
        let resolved = self.resolve(key)?;
        let metadata = match tokio::fs::metadata(&resolved).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(object_not_found(key));
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Stat failed: {}", resolved.display()).into()),
                });
            },
        };

        Ok(ObjectInfo { size: metadata.len(), content_type: self.content_type_of(key).await? })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(key)?;
        if !fs::remove_file(&resolved).await? {
            return Err(object_not_found(key));
        }

        // The sidecar is informational; a missing one is not an error.
        let meta_path = self.resolve(&format!("{key}{META_SUFFIX}"))?;
        let _ = fs::remove_file(&meta_path).await?;
        Ok(())
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.inner.base_url, key)
    }
}

impl FsObjectStore {
    async fn content_type_of(&self, key: &str) -> Result<String, StorageError> {
        let meta_path = self.resolve(&format!("{key}{META_SUFFIX}"))?;
        match fs::read_file(&meta_path).await? {
            Some(encoded) => {
                let meta: ObjectMeta =
                    postcard::from_bytes(&encoded).context("Object metadata decoding failed")?;
                Ok(meta.content_type)
            },
            None => Ok(DEFAULT_CONTENT_TYPE.to_owned()),
        }
    }
}
