use std::borrow::Cow;

/// A specialized [`MailerError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The message is structurally unsendable (e.g. no body at all).
    #[error("Invalid message{}: {message}", format_context(.context))]
    InvalidMessage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The underlying transport failed to deliver the message.
    #[error("Transport error{}: {message}", format_context(.context))]
    Transport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches human-readable context to a mailer error in flight.
pub trait MailerErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MailerError>;
}

impl<T> MailerErrorExt<T> for Result<T, MailerError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                MailerError::InvalidMessage { context: c, .. }
                | MailerError::Transport { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
