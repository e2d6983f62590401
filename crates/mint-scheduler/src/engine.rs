use std::time::Duration;

use mint_core::MintConfig;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::capabilities::MintCapabilities;
use crate::cycle::run_cycle;
use crate::outcome::CycleOutcome;
use crate::state::{SchedulerState, format_minutes};
use crate::stop::{StopSignal, sleep_with_stop};

/// Moltbook's informal posting cadence. Cycles started sooner than this
/// after a success are logged, not blocked.
pub const SOFT_LIMIT: Duration = Duration::from_secs(30 * 60);

/// Totals reported when a run loop ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub cycles: u32,
    pub successes: u32,
    pub rate_limited: u32,
    pub failures: u32,
    /// Interval chosen after each cycle, in order.
    pub intervals: Vec<Duration>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, outcome: &CycleOutcome, interval: Duration) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Success(_) => self.successes += 1,
            CycleOutcome::RateLimited { .. } => self.rate_limited += 1,
            CycleOutcome::Failed(_) => self.failures += 1,
        }
        self.intervals.push(interval);
    }
}

/// Run mint cycles until `stop` is raised or `max_cycles` is reached.
///
/// The first cycle waits one success interval. After every cycle the next
/// interval comes from [`SchedulerState`]: base interval on success, the
/// server hint on 429, exponential backoff on errors. Failures never end the
/// loop.
pub async fn run_loop<C>(caps: &C, config: &MintConfig, stop: &StopSignal) -> RunSummary
where
    C: MintCapabilities + ?Sized,
{
    let mut state = SchedulerState::new(config);
    let mut summary = RunSummary::default();

    info!(
        "[AUTO-MINT] Started. First run in {}",
        format_minutes(state.current_interval)
    );
    if !sleep_with_stop(state.current_interval, stop).await {
        info!("[AUTO-MINT] Stopped before first run.");
        return summary;
    }

    while !should_stop(config, &state, stop) {
        if let Some(last) = state.last_success {
            let elapsed = last.elapsed();
            if elapsed < SOFT_LIMIT {
                warn!(
                    "[AUTO-MINT] Soft Moltbook limit: last success {} ago. Will still try; server may respond 429.",
                    format_minutes(elapsed)
                );
            }
        }

        let outcome = run_cycle(caps, config).await;
        let interval = match &outcome {
            CycleOutcome::Success(receipt) => {
                let interval = state.record_success(Instant::now());
                info!(
                    "[AUTO-MINT] Mint #{} OK (post_id={}). Next run in {}",
                    state.cycles_completed,
                    receipt.post_id,
                    format_minutes(interval)
                );
                interval
            }
            CycleOutcome::RateLimited { retry_after } => {
                let interval = state.record_rate_limited(*retry_after);
                match retry_after {
                    Some(_) => info!(
                        "[AUTO-MINT] RATE LIMIT: 429 Too Many Requests (server hint). Next attempt in {}",
                        format_minutes(interval)
                    ),
                    None => info!(
                        "[AUTO-MINT] RATE LIMIT: 429 without retry_after, assuming 30min limit. Next attempt in {}",
                        format_minutes(interval)
                    ),
                }
                interval
            }
            CycleOutcome::Failed(failure) => {
                let interval = state.record_error();
                warn!(
                    "[AUTO-MINT] ERROR: {failure}. Backoff #{}, wait {}",
                    state.consecutive_errors,
                    format_minutes(interval)
                );
                interval
            }
        };
        summary.record(&outcome, interval);

        if should_stop(config, &state, stop) {
            break;
        }
        if !sleep_with_stop(interval, stop).await {
            break;
        }
    }

    info!("[AUTO-MINT] Stopped. Total runs: {}", state.cycles_completed);
    summary
}

fn should_stop(config: &MintConfig, state: &SchedulerState, stop: &StopSignal) -> bool {
    stop.is_raised() || (config.max_cycles > 0 && state.cycles_completed >= config.max_cycles)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
