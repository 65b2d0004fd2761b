//! Outbound mail plumbing for admin notifications.
//!
//! This crate defines the transport contract the notifier dispatches
//! through, plus the two pieces every deployment needs around it:
//!
//! - [`Email`] — a fully rendered message (recipient, subject, HTML and/or
//!   plain-text body, optional CC/BCC).
//! - [`MailTransport`] — the object-safe delivery contract. A production
//!   binary plugs an SMTP or provider-API implementation in here; the crate
//!   itself ships [`MemoryTransport`] for tests and local development.
//! - [`Retrying`] — a decorator adding bounded attempts with doubling
//!   backoff, so callers can treat a transport as "retries internally".
//!
//! Delivery here is best-effort by design: a transport reports failure, it
//! never escalates it.
//!
//! ## Example
//!
//! ```rust
//! use odk_mailer::{Email, MailTransport, MemoryTransport, RetryPolicy, Retrying};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), odk_mailer::MailerError> {
//! let transport = Retrying::new(MemoryTransport::new(), RetryPolicy::default());
//!
//! let email = Email::new("admin@example.com", "New order #1")
//!     .text("Order #1 is waiting for processing.");
//! transport.send(&email).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod message;
mod retry;

pub use error::{MailerError, MailerErrorExt};
pub use memory::MemoryTransport;
pub use message::Email;
pub use retry::{RetryPolicy, Retrying};

use async_trait::async_trait;

/// The delivery contract consumed by the notifier.
///
/// Implementations own their connection handling and authentication; the
/// caller assumes a `send` can block arbitrarily long and bounds it with its
/// own deadline. A transport must tolerate being abandoned mid-call: it is
/// not transactional with anything else.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    /// Delivers a single message.
    ///
    /// # Errors
    /// Returns [`MailerError::InvalidMessage`] for messages without a body
    /// and [`MailerError::Transport`] when delivery fails.
    async fn send(&self, email: &Email) -> Result<(), MailerError>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for std::sync::Arc<T> {
    async fn send(&self, email: &Email) -> Result<(), MailerError> {
        (**self).send(email).await
    }
}
