//! Best-effort background notifications.
//!
//! This crate delivers the "fire an email after the primary write" side
//! effect without ever making the primary operation's success contingent on
//! it. A caller hands a [`Notification`] to [`Notifier::dispatch`] and
//! immediately proceeds; the attempt runs on a bounded pool with its own
//! deadline, and its outcome is observable only through logs and counters.
//!
//! ## Lifecycle of an attempt
//!
//! 1. **Dispatched** — the caller gets a [`Dispatch`] handle back right
//!    away. The handle's [`Dispatch::grace`] waits a short window purely to
//!    catch same-instant failures for logging; its expiry is
//!    [`Outcome::InFlight`], never an error.
//! 2. **Attempting** — the detached task acquires a pool permit and races
//!    the transport call against the task deadline. The transport may retry
//!    internally (see `odk_mailer::Retrying`); the deadline caps the whole
//!    attempt-bundle either way.
//! 3. **Completed / Failed / TimedOut** — logged and counted. Nothing is
//!    persisted, nothing is retried after the deadline: at most one
//!    attempt-bundle per primary event.
//!
//! There are no ordering guarantees between concurrently dispatched
//! notifications, and each attempt owns its message outright, so the pool
//! shares no mutable state.
//!
//! ## Shutdown
//!
//! [`Notifier::close`] stops accepting new work and drains outstanding
//! attempts within a grace period, so a process shutdown does not leak
//! half-finished deliveries.
//!
//! ## Example
//!
//! ```rust
//! use odk_mailer::{Email, MemoryTransport};
//! use odk_notifier::{Notification, Notifier, Outcome};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), odk_notifier::NotifierError> {
//! let notifier = Notifier::builder()
//!     .transport(Arc::new(MemoryTransport::new()))
//!     .build()?;
//!
//! let email = Email::new("admin@example.com", "New order #7").text("Details inside.");
//! let dispatch = notifier.dispatch(Notification::new(email));
//!
//! // The caller's own response does not depend on this outcome.
//! let outcome = dispatch.grace(Duration::from_secs(2)).await;
//! assert_ne!(outcome, Outcome::Failed);
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod task;

pub use builder::NotifierBuilder;
pub use engine::{Dispatch, Notifier, NotifierStats, Outcome};
pub use error::{NotifierError, NotifierErrorExt};
pub use task::Notification;
