use crate::engine::{Notifier, NotifierInner, Stats};
use crate::error::NotifierError;
use odk_mailer::MailTransport;
use private::Sealed;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Default bound on concurrently running delivery attempts.
const DEFAULT_CAPACITY: u32 = 8;

/// Default deadline for a single attempt-bundle.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct NoTransport;
#[derive(Debug)]
pub struct WithTransport(Arc<dyn MailTransport>);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoTransport {}
impl Sealed for WithTransport {}

/// A builder for configuring and initializing the [`Notifier`].
#[allow(private_bounds)]
#[derive(Debug)]
pub struct NotifierBuilder<T: Sealed = NoTransport> {
    transport: T,
    capacity: u32,
    deadline: Duration,
}

impl Default for NotifierBuilder {
    fn default() -> Self {
        Self { transport: NoTransport, capacity: DEFAULT_CAPACITY, deadline: DEFAULT_DEADLINE }
    }
}

#[allow(private_bounds)]
impl<T: Sealed> NotifierBuilder<T> {
    /// Bounds the number of attempts running at once; further dispatches
    /// queue inside their detached tasks, never on the caller.
    #[must_use = "The builder must be built before it dispatches anything"]
    pub const fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the authoritative deadline for a single attempt-bundle.
    ///
    /// Transport-internal retries must fit inside this budget; when it
    /// expires the in-flight call is abandoned and the outcome is recorded
    /// as timed out.
    #[must_use = "The builder must be built before it dispatches anything"]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

impl NotifierBuilder<NoTransport> {
    /// Creates a new builder with default capacity and deadline.
    #[must_use = "Builder must be given a transport before use"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the delivery transport.
    pub fn transport(self, transport: Arc<dyn MailTransport>) -> NotifierBuilder<WithTransport> {
        NotifierBuilder {
            transport: WithTransport(transport),
            capacity: self.capacity,
            deadline: self.deadline,
        }
    }
}

impl NotifierBuilder<WithTransport> {
    /// Finalizes notifier construction.
    ///
    /// # Errors
    /// Returns [`NotifierError::InvalidConfiguration`] for a zero capacity
    /// or a zero deadline.
    pub fn build(self) -> Result<Notifier, NotifierError> {
        if self.capacity == 0 {
            return Err(NotifierError::InvalidConfiguration {
                message: "Capacity must be at least 1".into(),
                context: None,
            });
        }
        if self.deadline.is_zero() {
            return Err(NotifierError::InvalidConfiguration {
                message: "Deadline must be non-zero".into(),
                context: None,
            });
        }

        Ok(Notifier {
            inner: Arc::new(NotifierInner {
                transport: self.transport.0,
                pool: Semaphore::new(self.capacity as usize),
                deadline: self.deadline,
                closing: AtomicBool::new(false),
                inflight: AtomicU64::new(0),
                drained: Notify::new(),
                stats: Stats::default(),
            }),
        })
    }
}
