#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Another moltmint instance holds the lock (PID {0})")]
    InstanceLocked(u32),

    #[error("Profile '{0}' not found in configuration")]
    ProfileNotFound(String),

    #[error("Missing {0} (set it in config.toml or the environment)")]
    MissingApiKey(&'static str),

    #[error("Invalid inscription: {0}")]
    InvalidInscription(String),

    #[error("Invalid mint configuration: {0}")]
    InvalidConfig(String),
}
