//! Auto-mint scheduling: one publish → verify → index cycle, the
//! backoff-driven run loop around it, and the flat-retry daemon variant.

pub mod capabilities;
pub mod cycle;
pub mod daemon;
pub mod engine;
pub mod fake;
pub mod outcome;
pub mod state;
pub mod stop;

pub use capabilities::MintCapabilities;
pub use cycle::{INDEX_DELAY, run_cycle, run_cycle_once};
pub use daemon::{DaemonPolicy, run_daemon};
pub use engine::{RunSummary, SOFT_LIMIT, run_loop};
pub use fake::FakeCapabilities;
pub use outcome::{CycleFailure, CycleOutcome, FailureKind, MintReceipt};
pub use state::{RATE_LIMIT_FALLBACK, SchedulerState};
pub use stop::{POLL_INTERVAL, StopSignal, sleep_with_stop};
