use odk_mailer::Email;
use std::time::Duration;

/// An ephemeral unit of notification work.
///
/// Created synchronously right after the primary write commits and executed
/// on a detached path. The task carries its own copy of everything it needs
/// (recipient, subject, rendered body) plus an optional per-task deadline
/// override; it is never persisted and never survives a process restart.
#[derive(Debug, Clone)]
pub struct Notification {
    email: Email,
    deadline: Option<Duration>,
}

impl Notification {
    /// Wraps a rendered message as a notification task.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self { email, deadline: None }
    }

    /// Overrides the notifier's default deadline for this task only.
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The recipient address, for logging.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.email.to
    }

    pub(crate) fn into_parts(self) -> (Email, Option<Duration>) {
        (self.email, self.deadline)
    }
}
