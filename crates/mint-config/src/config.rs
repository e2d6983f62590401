//! Settings file model.
//!
//! Every section is optional; missing keys fall back to the same defaults the
//! auto-minter has always used (35 min base interval, 10 min floor, 125 min
//! error backoff). API keys may come from the file or the environment
//! (`MOLTBOOK_API_KEY`, `OPENAI_API_KEY`, `OPENAI_MODEL`), the environment
//! winning when set.

use anyhow::{Context, Result, bail};
use mint_core::{AppError, DEFAULT_TARGET, MintConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::paths;
use crate::secret::mask_api_key;

pub const DEFAULT_PROFILE: &str = "default";

/// Top-level settings loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MintSettings {
    pub moltbook: MoltbookConfig,
    pub solver: SolverConfig,
    pub indexer: IndexerConfig,
    pub schedule: ScheduleConfig,
    pub daemon: DaemonConfig,
    pub history: HistoryConfig,
    /// Named token profiles (`[profiles.<name>]`).
    pub profiles: BTreeMap<String, ProfileConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoltbookConfig {
    pub base_url: String,
    pub api_key: String,
    pub publish_timeout_secs: u64,
    pub verify_timeout_secs: u64,
}

impl Default for MoltbookConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.moltbook.com/api/v1".to_string(),
            api_key: String::new(),
            publish_timeout_secs: 60,
            verify_timeout_secs: 15,
        }
    }
}

impl fmt::Debug for MoltbookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("publish_timeout_secs", &self.publish_timeout_secs)
            .field("verify_timeout_secs", &self.verify_timeout_secs)
            .finish()
    }
}

/// OpenAI-compatible endpoint used when the rule parser gives up.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Skip the rule parser and always ask the model.
    pub llm_only: bool,
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4.1-mini".to_string(),
            llm_only: false,
            max_attempts: 5,
            timeout_secs: 20,
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("model", &self.model)
            .field("llm_only", &self.llm_only)
            .field("max_attempts", &self.max_attempts)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Pause between posts during a history reindex.
    pub reindex_delay_secs: f64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            url: "https://mbc20.xyz/api/index-post".to_string(),
            timeout_secs: 15,
            reindex_delay_secs: 3.0,
        }
    }
}

/// Auto-mint timing, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub base_interval_minutes: f64,
    pub min_interval_minutes: f64,
    pub error_backoff_minutes: f64,
    /// 0 = run until stopped.
    pub max_cycles: u32,
    /// Unset keeps the backoff doubling without a ceiling.
    pub max_backoff_minutes: Option<f64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            base_interval_minutes: 35.0,
            min_interval_minutes: 10.0,
            error_backoff_minutes: 125.0,
            max_cycles: 0,
            max_backoff_minutes: None,
        }
    }
}

/// Flat-retry policy used by `moltmint daemon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub first_start_minutes: f64,
    /// Retry 5xx responses on their own short interval.
    pub retry_server_errors: bool,
    pub server_retry_minutes: f64,
    /// Constant pause after any other failure; unset uses the base interval.
    pub fixed_backoff_minutes: Option<f64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            first_start_minutes: 0.0,
            retry_server_errors: true,
            server_retry_minutes: 1.0,
            fixed_backoff_minutes: Some(31.0),
        }
    }
}

impl DaemonConfig {
    pub fn first_start(&self) -> Duration {
        minutes(self.first_start_minutes)
    }

    pub fn server_retry_interval(&self) -> Duration {
        minutes(self.server_retry_minutes)
    }

    pub fn fixed_backoff(&self) -> Option<Duration> {
        self.fixed_backoff_minutes.map(minutes)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Defaults to `<state dir>/mbc20_history.log`.
    pub path: Option<PathBuf>,
}

/// What to mint and how the post looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub target: String,
    pub tick: String,
    pub amt: String,
    pub title: String,
    pub description: String,
    pub agent_label: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            tick: String::new(),
            amt: String::new(),
            title: mint_core::title::DEFAULT_TITLE.to_string(),
            description: String::new(),
            agent_label: String::new(),
        }
    }
}

impl MintSettings {
    /// Load settings.
    ///
    /// Lookup order: explicit path, then `$MOLTMINT_CONFIG`, then
    /// `~/.config/moltmint/config.toml`. An explicitly named file must exist;
    /// a missing default file yields defaults. Environment key overrides are
    /// applied afterwards.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(paths::CONFIG_ENV).map(PathBuf::from);
        let mut settings = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from(&path)?,
            None => match paths::default_config_file() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Override API keys and the model from environment-style lookups.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("MOLTBOOK_API_KEY") {
            self.moltbook.api_key = key;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.solver.api_key = key;
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            self.solver.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let schedule = &self.schedule;
        let timings = [
            ("schedule.base_interval_minutes", schedule.base_interval_minutes),
            ("schedule.min_interval_minutes", schedule.min_interval_minutes),
            ("schedule.error_backoff_minutes", schedule.error_backoff_minutes),
            ("daemon.first_start_minutes", self.daemon.first_start_minutes),
            ("daemon.server_retry_minutes", self.daemon.server_retry_minutes),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }
        for (name, value) in [
            ("schedule.max_backoff_minutes", schedule.max_backoff_minutes),
            ("daemon.fixed_backoff_minutes", self.daemon.fixed_backoff_minutes),
        ] {
            if let Some(v) = value
                && (!v.is_finite() || v < 0.0)
            {
                bail!("{name} must be a non-negative number, got {v}");
            }
        }
        if self.solver.max_attempts == 0 {
            bail!("solver.max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Resolve a profile by name.
    ///
    /// Without a name, the `default` profile is used, or the only profile
    /// when exactly one is configured.
    pub fn profile(&self, name: Option<&str>) -> Result<&ProfileConfig, AppError> {
        match name {
            Some(name) => self
                .profiles
                .get(name)
                .ok_or_else(|| AppError::ProfileNotFound(name.to_string())),
            None => self
                .profiles
                .get(DEFAULT_PROFILE)
                .or_else(|| {
                    (self.profiles.len() == 1)
                        .then(|| self.profiles.values().next())
                        .flatten()
                })
                .ok_or_else(|| AppError::ProfileNotFound(DEFAULT_PROFILE.to_string())),
        }
    }

    /// Build the scheduler's run configuration for a profile.
    pub fn mint_config(&self, profile: &ProfileConfig) -> MintConfig {
        let schedule = &self.schedule;
        MintConfig {
            target: profile.target.clone(),
            tick: profile.tick.trim().to_string(),
            amount: profile.amt.trim().to_string(),
            base_interval: minutes(schedule.base_interval_minutes),
            min_interval: minutes(schedule.min_interval_minutes),
            error_backoff: minutes(schedule.error_backoff_minutes),
            max_cycles: schedule.max_cycles,
            agent_label: profile.agent_label.trim().to_string(),
            max_backoff: schedule.max_backoff_minutes.map(minutes),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.history
            .path
            .clone()
            .unwrap_or_else(paths::default_history_path)
    }

    pub fn moltbook_api_key(&self) -> Option<&str> {
        non_empty(&self.moltbook.api_key)
    }

    pub fn solver_api_key(&self) -> Option<&str> {
        non_empty(&self.solver.api_key)
    }

    /// Copy with API keys masked, for `config show`.
    pub fn redacted_for_display(&self) -> Self {
        let mut redacted = self.clone();
        redacted.moltbook.api_key = mask_api_key(&redacted.moltbook.api_key);
        redacted.solver.api_key = mask_api_key(&redacted.solver.api_key);
        redacted
    }

    /// Path the default template is written to.
    pub fn config_path() -> Result<PathBuf> {
        paths::default_config_file().context("Failed to determine config directory")
    }

    /// Default config TOML with comments, used by `moltmint config init`.
    pub fn default_template() -> String {
        r#"# moltmint configuration
# Location: ~/.config/moltmint/config.toml
#
# API keys may also come from MOLTBOOK_API_KEY / OPENAI_API_KEY.

[moltbook]
base_url = "https://www.moltbook.com/api/v1"
# api_key = "moltbook_sk_..."

[solver]
base_url = "https://api.openai.com/v1"
model = "gpt-4.1-mini"
llm_only = false      # true = skip the rule parser
# api_key = "sk-..."

[indexer]
url = "https://mbc20.xyz/api/index-post"
reindex_delay_secs = 3.0

[schedule]
base_interval_minutes = 35
min_interval_minutes = 10
error_backoff_minutes = 125   # doubles on consecutive errors
max_cycles = 0                # 0 = until stopped
# max_backoff_minutes = 1440  # optional ceiling for the doubling

[daemon]
first_start_minutes = 0
retry_server_errors = true
server_retry_minutes = 1
fixed_backoff_minutes = 31

[profiles.default]
target = "mbc20"
tick = "CLAW"
amt = "100"
title = "MBC-20 inscription"
description = ""
agent_label = ""
"#
        .to_string()
    }

    /// Write the default template, refusing to clobber an existing file
    /// unless `force` is set.
    pub fn save_default_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, Self::default_template())
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Minutes (as configured) to a `Duration`. Negative or non-finite values
/// clamp to zero.
pub fn minutes(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value * 60.0)
    } else {
        Duration::ZERO
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
