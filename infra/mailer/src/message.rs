use crate::error::MailerError;

/// A fully rendered outbound message.
///
/// Rendering happens before the message reaches a transport; transports see
/// final strings only. At least one of the HTML and plain-text bodies must
/// be present for the message to be sendable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl Email {
    /// Starts a message to a single recipient.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: None,
            text: None,
            cc: Vec::new(),
            bcc: Vec::new(),
        }
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Adds a carbon-copy recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Adds a blind-carbon-copy recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Checks that the message carries at least one body.
    ///
    /// # Errors
    /// Returns [`MailerError::InvalidMessage`] when both bodies are absent.
    pub fn ensure_sendable(&self) -> Result<(), MailerError> {
        if self.html.is_none() && self.text.is_none() {
            return Err(MailerError::InvalidMessage {
                message: "Either an HTML or a plain-text body must be provided".into(),
                context: None,
            });
        }
        Ok(())
    }
}
