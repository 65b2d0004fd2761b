use crate::builder::NotifierBuilder;
use crate::task::Notification;
use odk_mailer::{Email, MailTransport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore, oneshot};
use tracing::{debug, info, warn};

/// Terminal (or still-pending) state of one dispatched notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transport confirmed delivery.
    Completed,
    /// The transport exhausted its attempts, or the notifier was closing.
    Failed,
    /// The attempt-bundle hit its deadline; the in-flight call was
    /// abandoned and any eventual completion is discarded.
    TimedOut,
    /// The attempt was still running when the observer stopped watching.
    /// Not a failure condition.
    InFlight,
}

/// Monotonic outcome counters, readable at any time.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    dispatched: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

/// A point-in-time copy of the notifier's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotifierStats {
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
}

/// Inner notifier state shared between the handle and detached attempts.
#[allow(unreachable_pub)]
#[derive(Debug)]
pub struct NotifierInner {
    pub(crate) transport: Arc<dyn MailTransport>,
    pub(crate) pool: Semaphore,
    pub(crate) deadline: Duration,
    pub(crate) closing: AtomicBool,
    /// Attempts dispatched but not yet terminal, including those still
    /// queued for a pool permit.
    pub(crate) inflight: AtomicU64,
    pub(crate) drained: Notify,
    pub(crate) stats: Stats,
}

/// A thread-safe handle for dispatching best-effort notifications.
///
/// Cheaply clonable (`Arc` inner). Dispatching never blocks and never fails
/// the caller; delivery problems surface as logs and counters only. The
/// number of concurrently running attempts is bounded by the configured
/// capacity, and [`Notifier::close`] drains outstanding work on shutdown.
#[derive(Debug, Clone)]
pub struct Notifier {
    pub(crate) inner: Arc<NotifierInner>,
}

/// Observer handle for a single dispatched notification.
///
/// Dropping the handle detaches the attempt entirely; awaiting
/// [`Dispatch::grace`] watches it for a bounded window without ever turning
/// a delivery problem into a caller-visible error.
#[derive(Debug)]
pub struct Dispatch {
    rx: oneshot::Receiver<Outcome>,
}

impl Dispatch {
    /// Waits at most `window` for an early outcome, purely for logging.
    ///
    /// Expiry of the window is not a failure: the attempt keeps running and
    /// the result is [`Outcome::InFlight`].
    pub async fn grace(self, window: Duration) -> Outcome {
        match tokio::time::timeout(window, self.rx).await {
            Ok(Ok(outcome)) => outcome,
            // The attempt was dropped without reporting (shutdown races);
            // from the observer's side it is simply no longer watchable.
            Ok(Err(_)) => Outcome::InFlight,
            Err(_) => Outcome::InFlight,
        }
    }

    /// Waits without bound for the attempt's terminal outcome.
    pub async fn outcome(self) -> Outcome {
        self.rx.await.unwrap_or(Outcome::InFlight)
    }
}

impl Notifier {
    /// Returns a new [`NotifierBuilder`] to configure the notifier.
    #[must_use]
    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::new()
    }

    /// Hands a notification to the pool and returns immediately.
    ///
    /// The returned [`Dispatch`] may be awaited for a bounded grace window
    /// or simply dropped; either way the primary operation's result is
    /// already independent of anything that happens here.
    pub fn dispatch(&self, task: Notification) -> Dispatch {
        let (tx, rx) = oneshot::channel();
        self.inner.stats.dispatched.fetch_add(1, Ordering::Relaxed);

        if self.inner.closing.load(Ordering::SeqCst) {
            warn!(to = %task.to(), "Notifier is closing; notification rejected");
            self.inner.stats.failed.fetch_add(1, Ordering::Relaxed);
            let _ = tx.send(Outcome::Failed);
            return Dispatch { rx };
        }

        let inner = Arc::clone(&self.inner);
        let (email, deadline) = task.into_parts();
        let deadline = deadline.unwrap_or(inner.deadline);

        // Counted before the spawn, so a close() racing with dispatch still
        // sees this attempt.
        inner.inflight.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let outcome = run_attempt(&inner, &email, deadline).await;
            let _ = tx.send(outcome);

            if inner.inflight.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.drained.notify_waiters();
            }
        });

        Dispatch { rx }
    }

    /// Dispatches without keeping an observer handle.
    pub fn dispatch_detached(&self, task: Notification) {
        drop(self.dispatch(task));
    }

    /// Stops accepting new notifications and drains outstanding attempts.
    ///
    /// Returns `true` once every attempt has finished within the grace
    /// period; `false` leaves stragglers running detached (they still
    /// respect their own deadlines) and logs the fact.
    pub async fn close(&self, grace: Duration) -> bool {
        self.inner.closing.store(true, Ordering::SeqCst);

        let deadline = tokio::time::Instant::now() + grace;
        loop {
            if self.inner.inflight.load(Ordering::SeqCst) == 0 {
                info!("Notifier drained");
                return true;
            }

            // Register interest before re-checking, so a decrement between
            // the check and the await cannot be missed.
            let drained = self.inner.drained.notified();
            if self.inner.inflight.load(Ordering::SeqCst) == 0 {
                info!("Notifier drained");
                return true;
            }

            if tokio::time::timeout_at(deadline, drained).await.is_err() {
                warn!(grace = ?grace, "Notifier closed with attempts still in flight");
                return false;
            }
        }
    }

    /// Returns a snapshot of the outcome counters.
    #[must_use]
    pub fn stats(&self) -> NotifierStats {
        NotifierStats {
            dispatched: self.inner.stats.dispatched.load(Ordering::Relaxed),
            completed: self.inner.stats.completed.load(Ordering::Relaxed),
            failed: self.inner.stats.failed.load(Ordering::Relaxed),
            timed_out: self.inner.stats.timed_out.load(Ordering::Relaxed),
        }
    }
}

/// Body of one detached attempt: queue for a permit, then race the
/// transport against the deadline.
async fn run_attempt(inner: &NotifierInner, email: &Email, deadline: Duration) -> Outcome {
    let Ok(_permit) = inner.pool.acquire().await else {
        // The pool only closes together with the whole process.
        inner.stats.failed.fetch_add(1, Ordering::Relaxed);
        return Outcome::Failed;
    };

    debug!(to = %email.to, subject = %email.subject, "Attempting notification delivery");

    match tokio::time::timeout(deadline, inner.transport.send(email)).await {
        Ok(Ok(())) => {
            info!(to = %email.to, subject = %email.subject, "Notification delivered");
            inner.stats.completed.fetch_add(1, Ordering::Relaxed);
            Outcome::Completed
        },
        Ok(Err(err)) => {
            warn!(to = %email.to, error = %err, "Notification transport failed");
            inner.stats.failed.fetch_add(1, Ordering::Relaxed);
            Outcome::Failed
        },
        Err(_) => {
            warn!(to = %email.to, deadline = ?deadline, "Notification timed out");
            inner.stats.timed_out.fetch_add(1, Ordering::Relaxed);
            Outcome::TimedOut
        },
    }
}
