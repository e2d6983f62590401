use std::path::PathBuf;

/// XDG app name used for config and state directories.
pub const APP_NAME: &str = "moltmint";

/// File name of the append-only history log.
pub const HISTORY_FILE_NAME: &str = "mbc20_history.log";

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "MOLTMINT_CONFIG";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// `~/.config/moltmint`, if a home directory can be determined.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file location: `~/.config/moltmint/config.toml`.
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// State directory for the history log and lock files.
///
/// Prefers the XDG state dir and falls back to the local data dir, then to
/// a temp directory on platforms without either.
pub fn state_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_path_buf()
        })
        .unwrap_or_else(state_dir_fallback)
}

pub fn state_dir_fallback() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_NAME}-state"))
}

pub fn default_history_path() -> PathBuf {
    state_dir().join(HISTORY_FILE_NAME)
}
