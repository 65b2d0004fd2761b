use std::borrow::Cow;

/// A specialized [`NotifierError`] enum of this crate.
///
/// Delivery failures and timeouts are deliberately *not* errors here; they
/// are terminal [`Outcome`](crate::Outcome)s of a detached attempt and never
/// propagate to the dispatching caller. This enum covers construction and
/// internal faults only.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// Failure when the notifier is incorrectly configured.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal notifier error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches human-readable context to a notifier error in flight.
pub trait NotifierErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, NotifierError>;
}

impl<T> NotifierErrorExt<T> for Result<T, NotifierError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                NotifierError::InvalidConfiguration { context: c, .. }
                | NotifierError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
