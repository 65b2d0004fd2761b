use crate::error::MailerError;
use crate::message::Email;
use crate::MailTransport;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry strategy with doubling backoff.
///
/// With the default policy the attempts run at `t = 0s` and `t = 2s`; the
/// wrapped transport is therefore done after at most two tries, well inside
/// the notifier's task deadline that caps the whole attempt-bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    /// Wait before the second attempt; doubles for each attempt after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 2, base_delay: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    /// Backoff to sleep after the given zero-based failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Decorator that adds bounded retries to any [`MailTransport`].
#[derive(Debug)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: MailTransport> Retrying<T> {
    /// Wraps a transport with the given retry policy.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: MailTransport> MailTransport for Retrying<T> {
    async fn send(&self, email: &Email) -> Result<(), MailerError> {
        email.ensure_sendable()?;

        let attempts = self.policy.attempts.max(1);
        let mut last_err = None;

        for attempt in 0..attempts {
            debug!(to = %email.to, attempt = attempt + 1, "Attempting delivery");

            match self.inner.send(email).await {
                Ok(()) => {
                    debug!(to = %email.to, "Message delivered");
                    return Ok(());
                },
                Err(err) => {
                    warn!(to = %email.to, attempt = attempt + 1, error = %err, "Delivery attempt failed");
                    last_err = Some(err);
                },
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(self.policy.delay_after(attempt)).await;
            }
        }

        Err(last_err.unwrap_or_else(|| MailerError::Transport {
            message: "Delivery failed with no recorded error".into(),
            context: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times before succeeding.
    #[derive(Debug, Default)]
    struct FlakyTransport {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakyTransport {
        fn failing(times: u32) -> Self {
            Self { failures_left: AtomicU32::new(times), calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl MailTransport for FlakyTransport {
        async fn send(&self, _email: &Email) -> Result<(), MailerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            }).is_ok()
            {
                return Err(MailerError::Transport {
                    message: "injected failure".into(),
                    context: None,
                });
            }
            Ok(())
        }
    }

    fn email() -> Email {
        Email::new("admin@example.com", "subject").text("body")
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_within_the_attempt_budget() {
        let transport = Retrying::new(FlakyTransport::failing(1), RetryPolicy::default());
        assert!(transport.send(&email()).await.is_ok());
        assert_eq!(transport.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn surfaces_the_last_error_when_exhausted() {
        let transport = Retrying::new(FlakyTransport::failing(5), RetryPolicy::default());
        let result = transport.send(&email()).await;
        assert!(matches!(result, Err(MailerError::Transport { .. })));
        assert_eq!(transport.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy { attempts: 3, base_delay: Duration::from_secs(2) };
        assert_eq!(policy.delay_after(0), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(4));

        let start = tokio::time::Instant::now();
        let transport = Retrying::new(FlakyTransport::failing(3), policy);
        let _ = transport.send(&email()).await;
        // Two sleeps: 2s after the first failure, 4s after the second.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn validates_the_message_before_any_attempt() {
        let transport = Retrying::new(FlakyTransport::default(), RetryPolicy::default());
        let bodyless = Email::new("admin@example.com", "subject");
        assert!(matches!(
            transport.send(&bodyless).await,
            Err(MailerError::InvalidMessage { .. })
        ));
        assert_eq!(transport.inner.calls.load(Ordering::SeqCst), 0);
    }
}
