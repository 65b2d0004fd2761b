//! Shared filesystem plumbing for the disk-backed engines: atomic writes,
//! missing-file aware reads, and stale temp-file cleanup.

use crate::error::{StorageError, StorageErrorExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use walkdir::{DirEntry, WalkDir};

/// Marker embedded in temporary file names so cleanup can recognize them.
const TMP_MARKER: &str = ".odktmp.";

/// Temp files older than this are considered orphaned by a crash.
const STALE_THRESHOLD: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    #[must_use]
    pub(crate) fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    pub(crate) fn decompress(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|source| StorageError::Decompress { source, context: None }),
        }
    }
}

/// Creates the engine root if needed and canonicalizes it, so later sandbox
/// checks compare against a physical path.
pub(crate) async fn bootstrap_root(root: &Path) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(root)
        .await
        .context(format!("Failed to bootstrap storage root: {}", root.display()))?;

    fs::canonicalize(root)
        .await
        .context(format!("Failed to resolve storage root: {}", root.display()))
}

/// Reads a whole file, mapping a missing file to `None`.
pub(crate) async fn read_file(resolved: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(resolved).await {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::Io {
            source: err,
            context: Some(format!("Read failed: {}", resolved.display()).into()),
        }),
    }
}

/// Removes a file, reporting whether it existed.
pub(crate) async fn remove_file(resolved: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(resolved).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(StorageError::Io {
            source: err,
            context: Some(format!("Delete failed: {}", resolved.display()).into()),
        }),
    }
}

/// Writes data to `resolved` atomically.
///
/// The data lands in a unique temp file first, is synced to hardware, and is
/// then renamed over the target, so the target is never observable in a
/// partially written state. Parent directories are created on demand.
pub(crate) async fn write_atomic(
    resolved: &Path,
    data: &[u8],
    tmp_counter: &AtomicU64,
) -> Result<(), StorageError> {
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent)
            .await
            .context(format!("Failed to create parents for {}", resolved.display()))?;
    }

    let temp = unique_tmp_path(resolved, tmp_counter);

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .await
            .context(format!("Temp creation failed: {}", temp.display()))?;
        file.write_all(data).await.context("Write failed")?;
        file.sync_all().await.context("Hardware sync failed")?;
    }

    if let Err(err) = fs::rename(&temp, &resolved).await {
        if err.kind() == std::io::ErrorKind::AlreadyExists {
            fs::remove_file(&resolved)
                .await
                .context(format!("Failed to replace existing file: {}", resolved.display()))?;
            fs::rename(&temp, &resolved).await.context(format!(
                "Atomic swap failed: {} -> {}",
                temp.display(),
                resolved.display()
            ))?;
        } else {
            return Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                        .into(),
                ),
            });
        }
    }

    if let Some(parent) = resolved.parent() {
        sync_dir(parent).await;
    }

    debug!(path = %resolved.display(), "File saved atomically");
    Ok(())
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    let tmp_name = format!("{file_name}{TMP_MARKER}{counter}");
    target.with_file_name(tmp_name)
}

/// Removes orphaned temp files left behind by previous crashes.
///
/// Non-critical: failures are logged and initialization proceeds.
pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .flatten()
        .filter(|e| e.path() != root)
        .for_each(|entry| {
            if entry.file_type().is_file() && is_tmp(&entry) && is_stale(&entry, now) {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        tracing::warn!(p = %entry.path().display(), err = %e, "IO fail");
                        failed += 1;
                    },
                }
            }
        });

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime) -> bool {
    std::fs::metadata(entry.path())
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_roundtrip() {
        let data = vec![42u8; 512];
        for mode in [Compression::None, Compression::Lz4] {
            let packed = mode.compress(&data);
            assert_eq!(mode.decompress(&packed).unwrap(), data);
        }
    }

    #[test]
    fn tmp_paths_are_unique() {
        let counter = AtomicU64::new(1);
        let target = Path::new("/data/000001.rec");
        let a = unique_tmp_path(target, &counter);
        let b = unique_tmp_path(target, &counter);
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains(TMP_MARKER));
    }
}
