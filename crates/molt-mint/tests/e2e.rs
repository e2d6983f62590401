// End-to-end tests for the moltmint binary.
// Network commands need live API keys and are not exercised here.

fn moltmint(args: &[&str]) -> std::process::Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_moltmint"))
        .args(args)
        .output()
        .expect("failed to run moltmint")
}

#[test]
fn cli_help_lists_commands() {
    let output = moltmint(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("auto-minter"));
    for cmd in ["run", "once", "daemon", "post", "solve", "reindex", "whoami", "config"] {
        assert!(stdout.contains(cmd), "missing {cmd} in help");
    }
    assert!(stdout.contains("--profile"));
    assert!(stdout.contains("--no-lock"));
}

#[test]
fn daemon_help_shows_watch_pid() {
    let output = moltmint(&["daemon", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--watch-pid"));
    assert!(stdout.contains("--first-start"));
}

#[test]
fn reindex_help_shows_skip_flags() {
    let output = moltmint(&["reindex", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--skip-indexed"));
    assert!(stdout.contains("--skip-errors"));
    assert!(stdout.contains("--delay"));
}

#[test]
fn post_help_lists_operations() {
    let output = moltmint(&["post", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for op in ["deploy", "mint", "transfer", "link"] {
        assert!(stdout.contains(op), "missing {op} in post help");
    }
}

#[test]
fn solve_self_test_passes_without_keys() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "").expect("write empty config");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_moltmint"))
        .args(["--config", config.to_str().expect("utf-8 path"), "solve", "--self-test"])
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to run moltmint solve --self-test");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("All 5 self-test puzzles passed."));
}

#[test]
fn config_init_writes_template() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("nested").join("config.toml");
    let config_arg = config.to_str().expect("utf-8 path");

    let output = moltmint(&["--config", config_arg, "config", "init"]);
    assert!(output.status.success(), "{output:?}");
    assert!(config.exists());

    let output = moltmint(&["--config", config_arg, "config", "init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));
}
