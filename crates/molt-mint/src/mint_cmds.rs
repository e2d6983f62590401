//! `run`, `once` and `daemon`: the scheduled minting commands.

use anyhow::{Result, bail};
use mint_config::{MintSettings, ProfileConfig, paths};
use mint_core::{AppError, MintConfig};
use mint_lock::{InstanceLock, acquire_instance_lock};
use mint_scheduler::state::format_minutes;
use mint_scheduler::{
    CycleOutcome, DaemonPolicy, MintCapabilities, RunSummary, StopSignal, run_cycle, run_daemon,
    run_loop,
};
use tracing::info;

use crate::live::LiveCapabilities;
use crate::shutdown;

const LOCK_NAME: &str = "moltmint";

/// Per-command overrides on top of the profile.
#[derive(Debug, Default)]
pub(crate) struct MintOverrides {
    pub target: Option<String>,
    pub max_cycles: Option<u32>,
}

/// Profile plus the validated run configuration built from it.
pub(crate) fn resolve_mint_config(
    settings: &MintSettings,
    profile: Option<&str>,
    overrides: MintOverrides,
) -> Result<(ProfileConfig, MintConfig)> {
    let profile = settings.profile(profile)?.clone();
    let mut config = settings.mint_config(&profile);
    if let Some(target) = overrides.target {
        config.target = target;
    }
    if let Some(max_cycles) = overrides.max_cycles {
        config.max_cycles = max_cycles;
    }
    config.validate()?;
    Ok((profile, config))
}

pub(crate) fn require_moltbook_key(settings: &MintSettings) -> Result<()> {
    if settings.moltbook_api_key().is_none() {
        bail!(AppError::MissingApiKey("MOLTBOOK_API_KEY"));
    }
    Ok(())
}

pub(crate) fn take_lock(no_lock: bool, reason: &str) -> Result<Option<InstanceLock>> {
    if no_lock {
        return Ok(None);
    }
    let lock = acquire_instance_lock(&paths::state_dir(), LOCK_NAME, reason)?;
    info!(path = %lock.lock_path().display(), "instance lock acquired");
    Ok(Some(lock))
}

pub(crate) async fn handle_run(
    settings: &MintSettings,
    profile: Option<&str>,
    overrides: MintOverrides,
    no_lock: bool,
) -> Result<()> {
    let (profile, config) = resolve_mint_config(settings, profile, overrides)?;
    require_moltbook_key(settings)?;
    let _lock = take_lock(no_lock, "run")?;

    let caps = LiveCapabilities::new(settings, &profile);
    let stop = StopSignal::new();
    shutdown::watch_ctrl_c(stop.clone());

    let summary = run_loop(&caps, &config, &stop).await;
    report_summary(&summary);
    Ok(())
}

pub(crate) async fn handle_once(
    settings: &MintSettings,
    profile: Option<&str>,
    overrides: MintOverrides,
    no_lock: bool,
) -> Result<()> {
    let (profile, config) = resolve_mint_config(settings, profile, overrides)?;
    require_moltbook_key(settings)?;
    let _lock = take_lock(no_lock, "once")?;

    let caps = LiveCapabilities::new(settings, &profile);
    match run_cycle(&caps, &config).await {
        CycleOutcome::Success(receipt) => {
            println!("{}", caps.post_url(&receipt.post_id));
            Ok(())
        }
        CycleOutcome::RateLimited {
            retry_after: Some(wait),
        } => bail!("Rate limited by Moltbook, retry in {}", format_minutes(wait)),
        CycleOutcome::RateLimited { retry_after: None } => bail!("Rate limited by Moltbook"),
        CycleOutcome::Failed(failure) => bail!("Mint failed ({failure})"),
    }
}

pub(crate) struct DaemonArgs {
    pub watch_pid: Option<u32>,
    pub max_cycles: Option<u32>,
    pub first_start_minutes: Option<f64>,
}

pub(crate) fn daemon_policy(
    settings: &MintSettings,
    first_start_minutes: Option<f64>,
) -> DaemonPolicy {
    let daemon = &settings.daemon;
    DaemonPolicy {
        first_start: first_start_minutes
            .map(mint_config::config::minutes)
            .unwrap_or_else(|| daemon.first_start()),
        retry_server_errors: daemon.retry_server_errors,
        server_retry_interval: daemon.server_retry_interval(),
        fixed_backoff: daemon.fixed_backoff(),
    }
}

pub(crate) async fn handle_daemon(
    settings: &MintSettings,
    profile: Option<&str>,
    args: DaemonArgs,
    no_lock: bool,
) -> Result<()> {
    let overrides = MintOverrides {
        target: None,
        max_cycles: args.max_cycles,
    };
    let (profile, config) = resolve_mint_config(settings, profile, overrides)?;
    require_moltbook_key(settings)?;
    let _lock = take_lock(no_lock, "daemon")?;
    info!("[DAEMON] Invoked; pid={} watch_pid={:?}", std::process::id(), args.watch_pid);

    let caps = LiveCapabilities::new(settings, &profile);
    let stop = StopSignal::new();
    shutdown::watch_ctrl_c(stop.clone());
    if let Some(pid) = args.watch_pid {
        shutdown::watch_pid(pid, stop.clone());
    }

    let policy = daemon_policy(settings, args.first_start_minutes);
    let summary = run_daemon(&caps, &config, &policy, &stop).await;
    report_summary(&summary);
    Ok(())
}

fn report_summary(summary: &RunSummary) {
    info!(
        cycles = summary.cycles,
        successes = summary.successes,
        rate_limited = summary.rate_limited,
        failures = summary.failures,
        "run finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> MintSettings {
        let mut settings = MintSettings::default();
        settings.profiles.insert(
            "default".to_string(),
            ProfileConfig {
                target: "m/mbc20".to_string(),
                tick: "CLAW".to_string(),
                amt: "100".to_string(),
                ..ProfileConfig::default()
            },
        );
        settings
    }

    #[test]
    fn test_overrides_apply_on_top_of_profile() {
        let (_, config) = resolve_mint_config(
            &settings(),
            None,
            MintOverrides {
                target: Some("m/general".to_string()),
                max_cycles: Some(3),
            },
        )
        .expect("resolve");
        assert_eq!(config.normalized_target(), "general");
        assert_eq!(config.max_cycles, 3);
        assert_eq!(config.tick, "CLAW");
    }

    #[test]
    fn test_unknown_profile_is_reported() {
        let err = resolve_mint_config(&settings(), Some("nope"), MintOverrides::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::ProfileNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_invalid_amount_fails_before_any_request() {
        let mut settings = settings();
        if let Some(profile) = settings.profiles.get_mut("default") {
            profile.amt = "a lot".to_string();
        }
        assert!(resolve_mint_config(&settings, None, MintOverrides::default()).is_err());
    }

    #[test]
    fn test_missing_moltbook_key() {
        let err = require_moltbook_key(&MintSettings::default()).unwrap_err();
        assert!(err.to_string().contains("MOLTBOOK_API_KEY"));
    }

    #[test]
    fn test_daemon_policy_from_settings() {
        let policy = daemon_policy(&MintSettings::default(), None);
        assert_eq!(policy, DaemonPolicy::default());

        let policy = daemon_policy(&MintSettings::default(), Some(2.0));
        assert_eq!(policy.first_start, Duration::from_secs(120));
    }
}
