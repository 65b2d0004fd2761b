//! File feature slice: admits payment-proof uploads and serves them back
//! through a path-validated proxy.
//!
//! Clients reference uploads by public paths of the form
//! `uploads/proofs/<name>` (or the legacy `uploads/<name>` shorthand). The
//! proxy validates the path before touching storage: anything outside the
//! `uploads/` area, or containing a `..` segment, is refused outright. The
//! object store underneath enforces its own sandbox as a second line.

mod error;
pub mod upload;

pub use error::FileError;
pub use upload::{AdmittedUpload, admit, content_type_for, extension_of};

use odk_storage::ObjectStore;
use std::sync::Arc;
use tracing::warn;

/// Public path prefix every served file must live under.
const PUBLIC_PREFIX: &str = "uploads/";

/// A file fetched through the proxy, with the headers-shaped metadata a
/// transport layer needs to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// `inline; filename="..."` or `attachment; filename="..."`.
    pub disposition: String,
}

/// Broad kind classification shown in file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
    Unknown,
}

impl FileKind {
    fn from_extension(extension: &str) -> Self {
        match extension {
            ".jpg" | ".jpeg" | ".png" | ".gif" => Self::Image,
            ".pdf" => Self::Document,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Unknown => "unknown",
        }
    }
}

/// Metadata about a stored file, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
    pub extension: String,
    pub path: String,
    pub url: String,
}

/// Path-validated read access to uploaded files.
#[derive(Debug, Clone)]
pub struct FileProxy {
    objects: Arc<dyn ObjectStore>,
}

impl FileProxy {
    #[must_use]
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Fetches a file for serving.
    ///
    /// `download` switches the disposition from inline display to an
    /// attachment.
    ///
    /// # Errors
    /// * [`FileError::Forbidden`] for paths outside `uploads/` or with
    ///   traversal segments.
    /// * [`FileError::NotFound`] when no object lives under the path.
    pub async fn serve(&self, path: &str, download: bool) -> Result<ServedFile, FileError> {
        let key = extract_key(path)?;
        let object = self.objects.get(&key).await?;

        let name = file_name_of(path);
        let mode = if download { "attachment" } else { "inline" };

        Ok(ServedFile {
            bytes: object.bytes,
            // Served type follows the extension, not whatever the uploader
            // declared.
            content_type: content_type_for(&extension_of(&name)).to_owned(),
            disposition: format!("{mode}; filename=\"{name}\""),
        })
    }

    /// Fetches metadata about a file without its payload.
    ///
    /// # Errors
    /// Same taxonomy as [`FileProxy::serve`].
    pub async fn info(&self, path: &str) -> Result<FileInfo, FileError> {
        let key = extract_key(path)?;
        let object = self.objects.head(&key).await?;

        let name = file_name_of(path);
        let extension = extension_of(&name);

        Ok(FileInfo {
            kind: FileKind::from_extension(&extension),
            size: object.size,
            url: self.objects.url(&key),
            path: path.to_owned(),
            name,
            extension,
        })
    }
}

/// Maps a public request path onto an object-store key.
///
/// Accepts `uploads/proofs/<name>` as well as the bare `uploads/<name>`
/// shorthand older links use; both resolve into the proofs directory.
fn extract_key(path: &str) -> Result<String, FileError> {
    let Some(rest) = path.strip_prefix(PUBLIC_PREFIX) else {
        warn!(path, "Invalid file access attempt");
        return Err(FileError::Forbidden {
            message: "Path is outside the public upload area".into(),
            context: None,
        });
    };

    if path.contains("..") {
        warn!(path, "Directory traversal attempt");
        return Err(FileError::Forbidden {
            message: "Traversal segments are not allowed".into(),
            context: None,
        });
    }

    if rest.is_empty() {
        return Err(FileError::Forbidden {
            message: "Empty file path".into(),
            context: None,
        });
    }

    let proof_prefix = format!("{}/", upload::PROOF_DIR);
    if rest.starts_with(&proof_prefix) {
        Ok(rest.to_owned())
    } else {
        Ok(format!("{}/{rest}", upload::PROOF_DIR))
    }
}

fn file_name_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_owned()
}
