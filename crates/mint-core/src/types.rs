use std::time::Duration;

use crate::{AppError, Inscription};

/// Target used when none is configured.
pub const DEFAULT_TARGET: &str = "mbc20";

/// Rewrite a target location alias to its canonical form.
///
/// `m/mbc20` loses its `m/` prefix and the common `bc20` typo becomes
/// `mbc20`. Applying it twice yields the same result as once.
pub fn normalize_target(raw: &str) -> String {
    let mut target = raw.trim();
    while let Some(prefix) = target.get(..2)
        && prefix.eq_ignore_ascii_case("m/")
    {
        target = target[2..].trim_start();
    }
    if target.is_empty() {
        return DEFAULT_TARGET.to_string();
    }
    if target.eq_ignore_ascii_case("bc20") {
        return DEFAULT_TARGET.to_string();
    }
    target.to_string()
}

/// Immutable per-run configuration of the auto-minter.
#[derive(Debug, Clone, PartialEq)]
pub struct MintConfig {
    /// Target location (submolt). Normalised before every publish.
    pub target: String,
    pub tick: String,
    /// String-encoded integer, passed through untouched.
    pub amount: String,
    /// Wait between successful cycles.
    pub base_interval: Duration,
    /// Floor applied to every computed interval.
    pub min_interval: Duration,
    /// Base unit of the exponential error backoff.
    pub error_backoff: Duration,
    /// 0 means unbounded.
    pub max_cycles: u32,
    pub agent_label: String,
    /// Optional ceiling for the exponential backoff. `None` keeps the
    /// uncapped doubling.
    pub max_backoff: Option<Duration>,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            tick: String::new(),
            amount: String::new(),
            base_interval: Duration::from_secs(35 * 60),
            min_interval: Duration::from_secs(10 * 60),
            error_backoff: Duration::from_secs(125 * 60),
            max_cycles: 0,
            agent_label: String::new(),
            max_backoff: None,
        }
    }
}

impl MintConfig {
    /// Interval used before the first cycle and after every success.
    pub fn success_interval(&self) -> Duration {
        self.base_interval.max(self.min_interval)
    }

    /// Canonical target location for this run.
    pub fn normalized_target(&self) -> String {
        normalize_target(&self.target)
    }

    /// The mint inscription this configuration publishes.
    pub fn inscription(&self) -> Result<Inscription, AppError> {
        Inscription::mint(&self.tick, &self.amount)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.inscription()?;
        if let Some(cap) = self.max_backoff
            && cap < self.min_interval
        {
            return Err(AppError::InvalidConfig(format!(
                "max_backoff ({}s) is below min_interval ({}s)",
                cap.as_secs(),
                self.min_interval.as_secs()
            )));
        }
        Ok(())
    }
}
