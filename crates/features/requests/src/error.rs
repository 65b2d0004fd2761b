use odk_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`RequestError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The submitted draft failed field validation.
    #[error("Invalid request{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The record store failed.
    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

impl From<StorageError> for RequestError {
    #[inline]
    fn from(source: StorageError) -> Self {
        Self::Storage { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
