use std::time::Duration;

use mint_core::MintConfig;
use tokio::time::Instant;

/// Wait assumed after a 429 that carried no usable hint.
pub const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(30 * 60);

/// Mutable scheduler state, owned by a single run loop.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub current_interval: Duration,
    pub consecutive_errors: u32,
    pub cycles_completed: u32,
    pub last_success: Option<Instant>,
    base_interval: Duration,
    min_interval: Duration,
    error_backoff: Duration,
    max_backoff: Option<Duration>,
}

impl SchedulerState {
    pub fn new(config: &MintConfig) -> Self {
        Self {
            current_interval: config.success_interval(),
            consecutive_errors: 0,
            cycles_completed: 0,
            last_success: None,
            base_interval: config.base_interval,
            min_interval: config.min_interval,
            error_backoff: config.error_backoff,
            max_backoff: config.max_backoff,
        }
    }

    /// Back to the base interval, errors cleared.
    pub fn record_success(&mut self, now: Instant) -> Duration {
        self.cycles_completed += 1;
        self.consecutive_errors = 0;
        self.last_success = Some(now);
        self.current_interval = self.base_interval.max(self.min_interval);
        self.current_interval
    }

    /// Honour the server hint (or the 30 minute fallback) without touching
    /// the error count.
    pub fn record_rate_limited(&mut self, retry_after: Option<Duration>) -> Duration {
        self.cycles_completed += 1;
        let wait = retry_after
            .filter(|hint| !hint.is_zero())
            .unwrap_or(RATE_LIMIT_FALLBACK);
        self.current_interval = wait.max(self.min_interval);
        self.current_interval
    }

    /// Exponential backoff: `error_backoff * 2^(n-1)` for the n-th error in
    /// a row, never below the minimum interval.
    pub fn record_error(&mut self) -> Duration {
        self.cycles_completed += 1;
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        self.current_interval = self.backoff_for(self.consecutive_errors);
        self.current_interval
    }

    fn backoff_for(&self, errors: u32) -> Duration {
        let factor = 2u32.checked_pow(errors.saturating_sub(1));
        let mut wait = factor
            .and_then(|factor| self.error_backoff.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        if let Some(cap) = self.max_backoff {
            wait = wait.min(cap);
        }
        wait.max(self.min_interval)
    }
}

/// `12.50min`
pub fn format_minutes(duration: Duration) -> String {
    format!("{:.2}min", duration.as_secs_f64() / 60.0)
}
