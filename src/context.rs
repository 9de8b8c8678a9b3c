use crate::error::{DualSearchError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation and deadline carried through every engine call.
///
/// Checked between cluster calls only; a request already in flight runs
/// until it completes or its own HTTP timeout (bounded by [`remaining`])
/// fires.
///
/// Clones share the cancellation flag.
///
/// [`remaining`]: CallContext::remaining
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// A context that never expires and is only cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        CallContext {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Time left before the deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail if the caller has cancelled or the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(DualSearchError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DualSearchError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_expires() {
        let ctx = CallContext::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = CallContext::background();
        let clone = ctx.clone();
        clone.cancel();
        assert_eq!(ctx.check().unwrap_err(), DualSearchError::Cancelled);
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = CallContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.check().unwrap_err(), DualSearchError::DeadlineExceeded);
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_future_deadline_passes() {
        let ctx = CallContext::with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().unwrap() > Duration::from_secs(50));
    }
}
