//! Upload admission: extension allowlist, size cap, and generated object
//! keys.

use crate::error::FileError;
use odk_domain::config::UploadConfig;
use odk_domain::model::Upload;
use odk_kernel::safe_token;
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory (under the object-store root) payment proofs are keyed into.
pub const PROOF_DIR: &str = "proofs";

/// Length of the random suffix in generated object keys.
const KEY_TOKEN_LEN: usize = 8;

/// An upload that passed admission, ready for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedUpload {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Validates an upload against the policy and assigns it an object key.
///
/// Keys are `proofs/<unix-millis>_<token><ext>`, so they never collide and
/// never embed the client-chosen file name.
///
/// # Errors
/// * [`FileError::UnsupportedType`] for extensions outside the allowlist.
/// * [`FileError::TooLarge`] for payloads over the size cap.
pub fn admit(policy: &UploadConfig, upload: Upload) -> Result<AdmittedUpload, FileError> {
    let extension = extension_of(&upload.file_name);

    if !policy.allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(FileError::UnsupportedType {
            message: format!("Extension '{extension}' is not allowed").into(),
            context: None,
        });
    }

    if upload.bytes.len() as u64 > policy.max_bytes {
        return Err(FileError::TooLarge {
            message: format!(
                "{} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                policy.max_bytes
            )
            .into(),
            context: None,
        });
    }

    let content_type = if upload.content_type.is_empty() {
        content_type_for(&extension).to_owned()
    } else {
        upload.content_type
    };

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    let key = format!("{PROOF_DIR}/{millis}_{}{extension}", safe_token(KEY_TOKEN_LEN));

    Ok(AdmittedUpload { key, content_type, bytes: upload.bytes })
}

/// Lowercased extension of a file name, with the leading dot; empty when
/// there is none.
#[must_use]
pub fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(String::new, |ext| format!(".{}", ext.to_lowercase()))
}

/// Content type served for a file extension.
#[must_use]
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
