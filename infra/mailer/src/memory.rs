use crate::error::MailerError;
use crate::message::Email;
use crate::MailTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory transport for tests and local development.
///
/// Captures every delivered message in an inspectable outbox and can be
/// switched into a failing mode to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    outbox: Mutex<Vec<Email>>,
    failing: AtomicBool,
}

impl MemoryTransport {
    /// Creates a transport that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that rejects everything.
    #[must_use]
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.failing.store(true, Ordering::SeqCst);
        transport
    }

    /// Switches the failing mode on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a copy of every message delivered so far.
    #[must_use]
    pub fn outbox(&self) -> Vec<Email> {
        self.outbox.lock().clone()
    }

    /// Number of delivered messages.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outbox.lock().len()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, email: &Email) -> Result<(), MailerError> {
        email.ensure_sendable()?;

        if self.failing.load(Ordering::SeqCst) {
            return Err(MailerError::Transport {
                message: "Memory transport is in failing mode".into(),
                context: None,
            });
        }

        self.outbox.lock().push(email.clone());
        Ok(())
    }
}
