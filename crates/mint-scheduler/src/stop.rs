use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Longest stretch a wait sleeps before looking at the stop flag again.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Debug, Default)]
struct StopInner {
    raised: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake any sleeper. Idempotent.
    pub fn raise(&self) {
        self.inner.raised.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }
}

/// Sleep for `duration` in steps of at most [`POLL_INTERVAL`], waking early
/// when `stop` is raised.
///
/// Returns `true` when the full duration elapsed and `false` when the sleep
/// was cut short by the stop signal.
pub async fn sleep_with_stop(duration: Duration, stop: &StopSignal) -> bool {
    let mut remaining = duration;
    loop {
        let notified = stop.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a raise in between is not lost.
        notified.as_mut().enable();

        if stop.is_raised() {
            return false;
        }
        if remaining.is_zero() {
            return true;
        }

        let step = remaining.min(POLL_INTERVAL);
        tokio::select! {
            _ = tokio::time::sleep(step) => remaining -= step,
            _ = &mut notified => return false,
        }
    }
}
