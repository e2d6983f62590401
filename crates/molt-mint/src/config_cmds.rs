use std::path::{Path, PathBuf};

use anyhow::Result;
use mint_config::{MintSettings, paths};

use crate::cli::ConfigCommands;

/// Which file `load` would read: `--config`, then `$MOLTMINT_CONFIG`, then
/// the XDG default.
fn effective_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(paths::CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    MintSettings::config_path()
}

pub(crate) fn handle_config(cmd: &ConfigCommands, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let settings = MintSettings::load(explicit)?;
            print!(
                "{}",
                toml::to_string_pretty(&settings.redacted_for_display())?
            );
        }
        ConfigCommands::Init { force } => {
            let path = effective_config_path(explicit)?;
            MintSettings::save_default_template(&path, *force)?;
            eprintln!("Wrote default config to {}", path.display());
            eprintln!("  Set profiles.default.tick/amt and your Moltbook API key before minting.");
        }
        ConfigCommands::Path => {
            let path = effective_config_path(explicit)?;
            let note = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{note}", path.display());
        }
    }
    Ok(())
}
