use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` / `..` lexically while ensuring the path never escapes the
/// sandbox root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Key attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute keys are not allowed in sandbox".into()),
                });
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(StorageError::PathTraversalAttempt {
            message: path.display().to_string().into(),
            context: Some("Empty keys are not allowed".into()),
        });
    }

    Ok(out)
}

/// Safely joins a storage key to the root and ensures it doesn't escape the
/// sandbox, including through symlinked ancestors.
pub(crate) fn resolve_key(root: &Path, key: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let key = key.as_ref();

    if key.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: format!("Absolute keys are not allowed in sandbox: {}", key.display())
                .into(),
            context: None,
        });
    }

    let safe_rel = normalize_relative(key)?;
    let joined = root.join(safe_rel);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_pending(root, &joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// Lexical-only guard for engines without a physical root (in-memory).
pub(crate) fn ensure_safe_key(key: &str) -> Result<(), StorageError> {
    let path = Path::new(key);
    if path.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: key.to_owned().into(),
            context: Some("Absolute keys are not allowed".into()),
        });
    }
    normalize_relative(path).map(|_| ())
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Key attempted to escape sandbox via .. sequences".into()),
        })
    }
}

/// Validates a path that doesn't exist yet by finding and verifying its
/// first existing ancestor.
///
/// Walks up from the target until it finds a parent on disk, canonicalizes
/// that parent, and checks it is still inside the sandbox. This catches
/// symlinked ancestors pointing outside the root without requiring all
/// intermediate directories to exist.
fn validate_pending(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Key is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_inner_dot_segments() {
        let out = normalize_relative(Path::new("a/./b/../c.bin")).unwrap();
        assert_eq!(out, PathBuf::from("a/c.bin"));
    }

    #[test]
    fn rejects_escaping_parent_segments() {
        assert!(matches!(
            normalize_relative(Path::new("../outside")),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
        assert!(matches!(
            normalize_relative(Path::new("a/../../outside")),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
    }

    #[test]
    fn rejects_absolute_and_empty_keys() {
        assert!(ensure_safe_key("/etc/passwd").is_err());
        assert!(ensure_safe_key("").is_err());
        assert!(ensure_safe_key("proofs/file.png").is_ok());
    }
}
