use super::*;
use std::collections::HashMap;
use tempfile::tempdir;

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_defaults_match_auto_mint_timings() {
    let settings = MintSettings::default();
    assert_eq!(settings.schedule.base_interval_minutes, 35.0);
    assert_eq!(settings.schedule.min_interval_minutes, 10.0);
    assert_eq!(settings.schedule.error_backoff_minutes, 125.0);
    assert_eq!(settings.schedule.max_cycles, 0);
    assert!(settings.schedule.max_backoff_minutes.is_none());
    assert_eq!(settings.moltbook.publish_timeout_secs, 60);
    assert_eq!(settings.moltbook.verify_timeout_secs, 15);
    assert_eq!(settings.solver.max_attempts, 5);
    assert_eq!(settings.daemon.fixed_backoff(), Some(Duration::from_secs(31 * 60)));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let (_dir, path) = write_config(
        r#"
[schedule]
base_interval_minutes = 40

[profiles.default]
tick = "CLAW"
amt = "100"
"#,
    );
    let settings = MintSettings::load_from(&path).unwrap();
    assert_eq!(settings.schedule.base_interval_minutes, 40.0);
    assert_eq!(settings.schedule.min_interval_minutes, 10.0);
    let profile = settings.profile(None).unwrap();
    assert_eq!(profile.tick, "CLAW");
    assert_eq!(profile.target, "mbc20");
    assert_eq!(profile.title, "MBC-20 inscription");
}

#[test]
fn test_load_explicit_missing_file_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = MintSettings::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to read config"));
}

#[test]
fn test_load_rejects_bad_toml() {
    let (_dir, path) = write_config("[schedule\nbase = ");
    let err = MintSettings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_validate_rejects_negative_interval() {
    let mut settings = MintSettings::default();
    settings.schedule.min_interval_minutes = -1.0;
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("schedule.min_interval_minutes"));
}

#[test]
fn test_validate_rejects_zero_attempts() {
    let mut settings = MintSettings::default();
    settings.solver.max_attempts = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_env_overrides_win_over_file() {
    let mut settings = MintSettings::default();
    settings.moltbook.api_key = "from-file".to_string();
    let env: HashMap<&str, &str> = [
        ("MOLTBOOK_API_KEY", "moltbook_sk_env"),
        ("OPENAI_API_KEY", "sk-env"),
        ("OPENAI_MODEL", "  "),
    ]
    .into_iter()
    .collect();
    settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.moltbook_api_key(), Some("moltbook_sk_env"));
    assert_eq!(settings.solver_api_key(), Some("sk-env"));
    // Blank values do not override.
    assert_eq!(settings.solver.model, "gpt-4.1-mini");
}

#[test]
fn test_missing_keys_are_none() {
    let settings = MintSettings::default();
    assert_eq!(settings.moltbook_api_key(), None);
    assert_eq!(settings.solver_api_key(), None);
}

#[test]
fn test_profile_resolution() {
    let mut settings = MintSettings::default();
    let err = settings.profile(None).unwrap_err();
    assert!(matches!(err, AppError::ProfileNotFound(ref n) if n == "default"));

    settings.profiles.insert(
        "claw".to_string(),
        ProfileConfig {
            tick: "CLAW".to_string(),
            ..ProfileConfig::default()
        },
    );
    // Single profile is used implicitly.
    assert_eq!(settings.profile(None).unwrap().tick, "CLAW");

    settings.profiles.insert(
        "reef".to_string(),
        ProfileConfig {
            tick: "REEF".to_string(),
            ..ProfileConfig::default()
        },
    );
    assert!(settings.profile(None).is_err());
    assert_eq!(settings.profile(Some("reef")).unwrap().tick, "REEF");
    assert!(settings.profile(Some("missing")).is_err());
}

#[test]
fn test_mint_config_converts_minutes() {
    let mut settings = MintSettings::default();
    settings.schedule.max_backoff_minutes = Some(600.0);
    let profile = ProfileConfig {
        target: "m/mbc20".to_string(),
        tick: " CLAW ".to_string(),
        amt: "100".to_string(),
        agent_label: "reef-bot".to_string(),
        ..ProfileConfig::default()
    };
    let config = settings.mint_config(&profile);
    assert_eq!(config.base_interval, Duration::from_secs(35 * 60));
    assert_eq!(config.min_interval, Duration::from_secs(600));
    assert_eq!(config.error_backoff, Duration::from_secs(125 * 60));
    assert_eq!(config.max_backoff, Some(Duration::from_secs(600 * 60)));
    assert_eq!(config.tick, "CLAW");
    assert_eq!(config.normalized_target(), "mbc20");
}

#[test]
fn test_minutes_clamps_invalid() {
    assert_eq!(minutes(-3.0), Duration::ZERO);
    assert_eq!(minutes(f64::NAN), Duration::ZERO);
    assert_eq!(minutes(0.5), Duration::from_secs(30));
}

#[test]
fn test_debug_masks_api_keys() {
    let mut settings = MintSettings::default();
    settings.moltbook.api_key = "moltbook_sk_secret123".to_string();
    settings.solver.api_key = "sk-proj-abcdefgh".to_string();
    let debug = format!("{settings:?}");
    assert!(!debug.contains("secret123"));
    assert!(!debug.contains("abcdefgh"));
    assert!(debug.contains("mol...t123"));
}

#[test]
fn test_redacted_for_display() {
    let mut settings = MintSettings::default();
    settings.moltbook.api_key = "moltbook_sk_secret123".to_string();
    let redacted = settings.redacted_for_display();
    assert_eq!(redacted.moltbook.api_key, "mol...t123");
    let rendered = toml::to_string(&redacted).unwrap();
    assert!(!rendered.contains("secret123"));
}

#[test]
fn test_history_path_override() {
    let mut settings = MintSettings::default();
    assert!(settings.history_path().ends_with("mbc20_history.log"));
    settings.history.path = Some(PathBuf::from("/tmp/custom.log"));
    assert_eq!(settings.history_path(), PathBuf::from("/tmp/custom.log"));
}

#[test]
fn test_default_template_parses() {
    let settings: MintSettings = toml::from_str(&MintSettings::default_template()).unwrap();
    settings.validate().unwrap();
    let profile = settings.profile(None).unwrap();
    assert_eq!(profile.tick, "CLAW");
    assert_eq!(settings.daemon.server_retry_minutes, 1.0);
}

#[test]
fn test_save_default_template_refuses_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    MintSettings::save_default_template(&path, false).unwrap();
    assert!(path.exists());

    let err = MintSettings::save_default_template(&path, false).unwrap_err();
    assert!(err.to_string().contains("--force"));
    MintSettings::save_default_template(&path, true).unwrap();
}

fn restore_env_var(key: &str, original: Option<std::ffi::OsString>) {
    // SAFETY: test-scoped env mutation serialized by `#[serial]`.
    unsafe {
        match original {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

#[test]
#[serial_test::serial]
fn test_load_honours_config_env_var() {
    let (_dir, path) = write_config("[schedule]\nmax_cycles = 3\n");
    let original = std::env::var_os(paths::CONFIG_ENV);
    // SAFETY: see restore_env_var.
    unsafe { std::env::set_var(paths::CONFIG_ENV, &path) };

    let loaded = MintSettings::load(None);
    restore_env_var(paths::CONFIG_ENV, original);

    assert_eq!(loaded.unwrap().schedule.max_cycles, 3);
}
