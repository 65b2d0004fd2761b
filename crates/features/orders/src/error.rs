use odk_files::FileError;
use odk_storage::StorageError;
use odk_vault::VaultError;
use std::borrow::Cow;

/// A specialized [`OrderError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The submitted draft failed field validation.
    #[error("Invalid order{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No order exists under the requested id.
    #[error("Order not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Credential sealing or unsealing failed; always a server-side
    /// failure, never worked around.
    #[error("Credential vault failure{}: {source}", format_context(.context))]
    Vault { source: VaultError, context: Option<Cow<'static, str>> },

    /// The record store failed.
    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    /// The upload was rejected or the object store failed.
    #[error("File failure{}: {source}", format_context(.context))]
    File { source: FileError, context: Option<Cow<'static, str>> },
}

impl From<VaultError> for OrderError {
    #[inline]
    fn from(source: VaultError) -> Self {
        Self::Vault { source, context: None }
    }
}

impl From<StorageError> for OrderError {
    #[inline]
    fn from(source: StorageError) -> Self {
        Self::Storage { source, context: None }
    }
}

impl From<FileError> for OrderError {
    #[inline]
    fn from(source: FileError) -> Self {
        Self::File { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
