//! Retry with exponential backoff, layered around any [`Model`].
//!
//! The invoker never retries on its own. Wrapping the model keeps the policy
//! outside the pipeline: the invoker still sees one call per chunk, it just
//! takes longer when the service is flaky.
//!
//! ```text
//! attempt 1  -> 503
//! sleep base * 2
//! attempt 2  -> 429
//! sleep base * 4
//! attempt 3  -> ok
//! ```
//!
//! With a [`CancelToken`] attached, a cancelled run stops retrying: the token
//! is polled while waiting out a backoff and checked again before the next
//! attempt, and the call ends with [`ModelError::Cancelled`].

use std::thread;
use std::time::Duration;

use crate::invoker::CancelToken;
use crate::model::{Model, ModelError, Response};

/// Longest single sleep while waiting out a backoff.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Values below 1 act as 1.
    pub max_attempts: usize,
    /// Delay unit; the wait before retry `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
    /// Upper bound on a single wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy with `max_attempts` attempts and the default delays.
    #[must_use]
    pub fn attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// The wait before retry number `attempt` (one-based).
    #[must_use]
    pub fn backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(16) as u32;
        self.base_delay
            .saturating_mul(1 << capped)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(16),
        }
    }
}

/// A [`Model`] that retries retryable failures of the model it wraps.
#[derive(Debug, Clone)]
pub struct Retrying<M> {
    inner: M,
    policy: RetryPolicy,
    cancel: Option<CancelToken>,
}

impl<M: Model> Retrying<M> {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: M, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            cancel: None,
        }
    }

    /// Stop retrying once `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Sleep for `delay`, waking early if the run is cancelled.
    fn pause(&self, delay: Duration) -> Result<(), ModelError> {
        let mut remaining = delay;
        loop {
            if self.is_cancelled() {
                return Err(ModelError::Cancelled);
            }
            if remaining.is_zero() {
                return Ok(());
            }
            let step = remaining.min(CANCEL_POLL);
            thread::sleep(step);
            remaining -= step;
        }
    }
}

impl<M: Model> Model for Retrying<M> {
    fn generate(&self, instruction: &str, chunk: &str) -> Result<Response, ModelError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0usize;
        loop {
            match self.inner.generate(instruction, chunk) {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                    attempt += 1;
                    self.pause(self.policy.backoff(attempt))?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with `status` for the first `failures` calls.
    struct Flaky {
        failures: usize,
        status: u16,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize, status: u16) -> Self {
            Self {
                failures,
                status,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Model for Flaky {
        fn generate(&self, _: &str, _: &str) -> Result<Response, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(ModelError::Status {
                    status: self.status,
                    body: String::new(),
                });
            }
            Ok(Response::from_text("done"))
        }
    }

    fn instant(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_recovers_from_transient_failures() {
        let model = Retrying::new(Flaky::new(2, 503), instant(3));
        assert_eq!(model.generate("i", "c").unwrap().text(), "done");
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let model = Retrying::new(Flaky::new(5, 429), instant(3));
        let err = model.generate("i", "c").unwrap_err();
        assert!(matches!(err, ModelError::Status { status: 429, .. }));
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_client_errors_not_retried() {
        let model = Retrying::new(Flaky::new(1, 400), instant(3));
        assert!(model.generate("i", "c").is_err());
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_still_calls_once() {
        let model = Retrying::new(Flaky::new(0, 500), instant(0));
        assert!(model.generate("i", "c").is_ok());
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_stops_retrying() {
        let token = CancelToken::new();
        let model = Retrying::new(Flaky::new(5, 503), instant(5)).with_cancel(token.clone());
        token.cancel();

        let err = model.generate("i", "c").unwrap_err();
        assert!(matches!(err, ModelError::Cancelled));
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_during_backoff_wakes_early() {
        let token = CancelToken::new();
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
        };
        let model = Retrying::new(Flaky::new(5, 429), policy).with_cancel(token.clone());

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            token.cancel();
        });
        let err = model.generate("i", "c").unwrap_err();
        canceller.join().unwrap();

        assert!(matches!(err, ModelError::Cancelled));
        assert_eq!(model.inner().calls.load(Ordering::SeqCst), 1);
    }
}
