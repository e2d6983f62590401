//! Configuration loading for moltmint (`~/.config/moltmint/config.toml`).

pub mod config;
pub mod paths;
mod secret;

pub use config::{
    DaemonConfig, HistoryConfig, IndexerConfig, MintSettings, MoltbookConfig, ProfileConfig,
    ScheduleConfig, SolverConfig,
};
pub use secret::mask_api_key;
