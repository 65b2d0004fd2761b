use odk_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`FileError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The requested path points outside the public upload area or tries
    /// to traverse out of it.
    #[error("Access denied{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No object lives under the requested path.
    #[error("File not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The upload's extension is not on the allowlist.
    #[error("Unsupported file type{}: {message}", format_context(.context))]
    UnsupportedType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The upload exceeds the size cap.
    #[error("File too large{}: {message}", format_context(.context))]
    TooLarge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The underlying object store failed.
    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

impl From<StorageError> for FileError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::ObjectNotFound { message, context } => {
                Self::NotFound { message, context }
            },
            StorageError::PathTraversalAttempt { message, context } => {
                Self::Forbidden { message, context }
            },
            other => Self::Storage { source: other, context: None },
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
