//! Stop-signal sources: Ctrl-C and, for the daemon, a watched parent PID.

use std::time::Duration;

use mint_lock::is_pid_alive;
use mint_scheduler::StopSignal;
use tracing::{info, warn};

const PID_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// First Ctrl-C raises `stop`; the loop then exits at its next poll. A
/// second Ctrl-C exits immediately.
pub(crate) fn watch_ctrl_c(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Ctrl-C received, stopping (press again to exit now)");
        stop.raise();
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second Ctrl-C, exiting without waiting");
            std::process::exit(130);
        }
    });
}

/// Raise `stop` once `pid` is no longer alive.
pub(crate) fn watch_pid(pid: u32, stop: StopSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PID_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if stop.is_raised() {
                return;
            }
            if !is_pid_alive(pid) {
                info!("Watched process {pid} is gone, stopping daemon");
                stop.raise();
                return;
            }
        }
    })
}
