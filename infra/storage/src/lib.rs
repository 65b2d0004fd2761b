//! Sandboxed storage engines for order records and uploaded objects.
//!
//! Two collaborator contracts live here, each with an in-memory engine for
//! tests and a filesystem engine for real deployments:
//!
//! - [`KvStore`] — durable record storage keyed by a numeric identifier
//!   (`put` / `get` / `delete` / `list` plus a monotonic id sequence), with
//!   the typed [`Records`] wrapper handling `postcard` encoding.
//! - [`ObjectStore`] — binary object storage
//!   (`put(key, bytes, content-type) -> url`, `get`, `head`, `delete`).
//!
//! # Core Properties
//!
//! - **Sandbox Security**: keys are relative paths only; lexical `..`
//!   normalization and canonicalization keep every resolved path inside the
//!   engine root.
//! - **Atomic Writes**: unique temp write + `fsync` + `rename`, so a crash
//!   never leaves a half-written record behind.
//! - **Self-Healing**: stale temporary files from previous crashes are
//!   purged when a filesystem engine connects.
//! - **Transparent Compression**: optional LZ4 block compression for record
//!   files, invisible to the consumer.
//!
//! # Example
//!
//! ```rust
//! use odk_storage::{FsStore, KvStore, Records};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Note { id: u64, body: String }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), odk_storage::StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! # let root = tmp.path().join("records");
//! let store = FsStore::builder(&root).connect().await?;
//! let notes: Records<Note> = Records::new(Arc::new(store));
//!
//! let id = notes.next_id();
//! notes.put(id, &Note { id, body: "first".into() }).await?;
//! assert!(notes.get(id).await?.is_some());
//! # Ok(())
//! # }
//! ```

mod error;
mod fs;
mod objects;
mod records;
mod security;

pub use error::{StorageError, StorageErrorExt};
pub use fs::Compression;
pub use objects::{FsObjectStore, MemoryObjectStore, ObjectInfo, ObjectStore, StoredObject};
pub use records::{FsStore, KvStore, MemoryStore, Records};
