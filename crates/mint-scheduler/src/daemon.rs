//! Flat-retry scheduling for unattended runs.
//!
//! Unlike [`run_loop`](crate::run_loop) the daemon never grows its waits:
//! 5xx responses retry on a short fixed interval and every other failure
//! waits a constant backoff.

use std::time::Duration;

use mint_core::MintConfig;
use tracing::info;

use crate::capabilities::MintCapabilities;
use crate::cycle::run_cycle;
use crate::engine::RunSummary;
use crate::outcome::{CycleOutcome, FailureKind};
use crate::state::format_minutes;
use crate::stop::{StopSignal, sleep_with_stop};

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonPolicy {
    /// Delay before the first cycle.
    pub first_start: Duration,
    pub retry_server_errors: bool,
    pub server_retry_interval: Duration,
    /// Wait after other failures; `None` uses the base interval.
    pub fixed_backoff: Option<Duration>,
}

impl Default for DaemonPolicy {
    fn default() -> Self {
        Self {
            first_start: Duration::ZERO,
            retry_server_errors: true,
            server_retry_interval: Duration::from_secs(60),
            fixed_backoff: Some(Duration::from_secs(31 * 60)),
        }
    }
}

impl DaemonPolicy {
    /// Wait after `outcome`. `config.min_interval` is not applied here: the
    /// 5xx retry and 429 hints are meant to undercut it.
    pub fn next_interval(&self, outcome: &CycleOutcome, config: &MintConfig) -> Duration {
        match outcome {
            CycleOutcome::Success(_) => config.base_interval,
            CycleOutcome::RateLimited { retry_after } => {
                retry_after.unwrap_or(config.base_interval)
            }
            CycleOutcome::Failed(failure)
                if failure.kind == FailureKind::ServerError && self.retry_server_errors =>
            {
                self.server_retry_interval
            }
            CycleOutcome::Failed(_) => self.fixed_backoff.unwrap_or(config.base_interval),
        }
    }
}

/// Serial cycles with [`DaemonPolicy`] waits until `stop` is raised or
/// `config.max_cycles` is reached.
pub async fn run_daemon<C>(
    caps: &C,
    config: &MintConfig,
    policy: &DaemonPolicy,
    stop: &StopSignal,
) -> RunSummary
where
    C: MintCapabilities + ?Sized,
{
    let mut summary = RunSummary::default();
    info!(
        "[DAEMON] Start target={} tick={} first_start={} base_interval={} retry_5xx={} every {} fixed_backoff={}",
        config.normalized_target(),
        config.tick,
        format_minutes(policy.first_start),
        format_minutes(config.base_interval),
        policy.retry_server_errors,
        format_minutes(policy.server_retry_interval),
        policy
            .fixed_backoff
            .map(format_minutes)
            .unwrap_or_else(|| "off".to_string()),
    );

    if !policy.first_start.is_zero() {
        info!(
            "[DAEMON] Waiting {} before first run.",
            format_minutes(policy.first_start)
        );
        if !sleep_with_stop(policy.first_start, stop).await {
            info!("[DAEMON] Stop requested during initial wait.");
            return summary;
        }
    }

    loop {
        if stop.is_raised() || (config.max_cycles > 0 && summary.cycles >= config.max_cycles) {
            break;
        }

        let outcome = run_cycle(caps, config).await;
        let interval = policy.next_interval(&outcome, config);
        match &outcome {
            CycleOutcome::Success(receipt) => info!(
                "[DAEMON] Mint success post_id={}, sleeping base_interval {}.",
                receipt.post_id,
                format_minutes(interval)
            ),
            CycleOutcome::RateLimited { .. } => info!(
                "[DAEMON] Got 429, sleeping {}.",
                format_minutes(interval)
            ),
            CycleOutcome::Failed(failure) => info!(
                "[DAEMON] Mint failed ({failure}), sleeping {}.",
                format_minutes(interval)
            ),
        }
        summary.record(&outcome, interval);

        if config.max_cycles > 0 && summary.cycles >= config.max_cycles {
            break;
        }
        if !sleep_with_stop(interval, stop).await {
            break;
        }
    }

    info!("[DAEMON] Exiting after {} cycles.", summary.cycles);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeCapabilities;
    use crate::outcome::CycleFailure;
    use serde_json::json;
    use tokio::time::Instant;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn config(max_cycles: u32) -> MintConfig {
        MintConfig {
            tick: "CLAW".to_string(),
            amount: "1".to_string(),
            base_interval: secs(35 * 60),
            min_interval: secs(35 * 60),
            max_cycles,
            ..MintConfig::default()
        }
    }

    fn failed(kind: FailureKind) -> CycleOutcome {
        CycleOutcome::Failed(CycleFailure::new(kind, "x"))
    }

    #[test]
    fn test_policy_intervals() {
        let policy = DaemonPolicy::default();
        let cfg = config(0);
        assert_eq!(
            policy.next_interval(&CycleOutcome::RateLimited { retry_after: Some(secs(120)) }, &cfg),
            secs(120)
        );
        assert_eq!(
            policy.next_interval(&CycleOutcome::RateLimited { retry_after: None }, &cfg),
            secs(35 * 60)
        );
        assert_eq!(
            policy.next_interval(&failed(FailureKind::ServerError), &cfg),
            secs(60)
        );
        assert_eq!(
            policy.next_interval(&failed(FailureKind::Network), &cfg),
            secs(31 * 60)
        );
    }

    #[test]
    fn test_policy_ignores_min_interval_floor() {
        let policy = DaemonPolicy::default();
        let cfg = MintConfig {
            min_interval: secs(40 * 60),
            ..config(0)
        };
        assert_eq!(
            policy.next_interval(&failed(FailureKind::ServerError), &cfg),
            secs(60)
        );
        assert_eq!(
            policy.next_interval(&CycleOutcome::RateLimited { retry_after: Some(secs(300)) }, &cfg),
            secs(300)
        );
        assert_eq!(
            policy.next_interval(&failed(FailureKind::Network), &cfg),
            secs(31 * 60)
        );
    }

    #[test]
    fn test_policy_without_fixed_backoff_or_5xx_retry() {
        let policy = DaemonPolicy {
            retry_server_errors: false,
            fixed_backoff: None,
            ..DaemonPolicy::default()
        };
        let cfg = config(0);
        assert_eq!(
            policy.next_interval(&failed(FailureKind::ServerError), &cfg),
            secs(35 * 60)
        );
        assert_eq!(
            policy.next_interval(&failed(FailureKind::Validation), &cfg),
            secs(35 * 60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemon_waits_do_not_grow() {
        let caps = FakeCapabilities::new();
        for _ in 0..3 {
            caps.push_publish(FakeCapabilities::status(400, json!({"error": "bad"})));
        }
        let summary =
            run_daemon(&caps, &config(3), &DaemonPolicy::default(), &StopSignal::new()).await;
        assert_eq!(summary.intervals, vec![secs(31 * 60); 3]);
        assert_eq!(summary.failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemon_first_start_delay() {
        let caps = FakeCapabilities::new();
        let policy = DaemonPolicy {
            first_start: secs(300),
            ..DaemonPolicy::default()
        };
        caps.push_publish(FakeCapabilities::status(502, json!({})));
        let start = Instant::now();
        let summary = run_daemon(&caps, &config(1), &policy, &StopSignal::new()).await;
        assert_eq!(start.elapsed(), secs(300));
        assert_eq!(summary.intervals, vec![secs(60)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemon_stops_on_signal() {
        let caps = FakeCapabilities::new();
        let stop = StopSignal::new();
        let raiser = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(secs(45 * 60)).await;
            raiser.raise();
        });
        let summary = run_daemon(&caps, &config(0), &DaemonPolicy::default(), &stop).await;
        // Cycle at t=0, then t=35min+10s; stop lands in the second wait.
        assert_eq!(summary.successes, 2);
    }
}
