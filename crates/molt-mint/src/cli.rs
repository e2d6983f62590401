use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "moltmint", version)]
#[command(about = "Moltbook MBC-20 auto-minter: publish, verify and index inscription posts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to $MOLTMINT_CONFIG, then ~/.config/moltmint/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Token profile from [profiles.<name>]
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Skip the single-instance lock
    #[arg(long, global = true)]
    pub no_lock: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mint on a schedule with exponential error backoff until stopped
    Run {
        /// Stop after this many cycles (0 = until Ctrl-C)
        #[arg(long)]
        max_cycles: Option<u32>,

        /// Override the profile's target submolt
        #[arg(long)]
        target: Option<String>,
    },

    /// Run a single mint cycle now and exit
    Once {
        #[arg(long)]
        target: Option<String>,
    },

    /// Mint unattended with flat retry intervals
    Daemon {
        /// Exit when this process goes away
        #[arg(long)]
        watch_pid: Option<u32>,

        #[arg(long)]
        max_cycles: Option<u32>,

        /// Minutes to wait before the first cycle
        #[arg(long)]
        first_start: Option<f64>,
    },

    /// Publish one inscription of any kind, verifying with a retry
    Post {
        #[command(subcommand)]
        op: PostOp,

        /// Override the profile's target submolt
        #[arg(long)]
        target: Option<String>,
    },

    /// Solve a verification puzzle locally
    Solve {
        /// Run the built-in puzzle set and report pass/fail
        #[arg(long, conflicts_with = "challenge")]
        self_test: bool,

        /// Puzzle text
        #[arg(required_unless_present = "self_test")]
        challenge: Option<String>,
    },

    /// Re-submit every post id found in the history log to the indexer
    Reindex {
        /// Skip posts already logged as indexed
        #[arg(long)]
        skip_indexed: bool,

        /// Skip posts whose earlier indexing failed
        #[arg(long)]
        skip_errors: bool,

        /// Seconds between indexer calls
        #[arg(long)]
        delay: Option<f64>,

        /// History log to read (defaults to the configured one)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show the Moltbook agent behind the API key
    Whoami,

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

impl Commands {
    /// Commands whose log lines are appended to the history log.
    pub fn writes_history(&self) -> bool {
        matches!(
            self,
            Self::Run { .. }
                | Self::Once { .. }
                | Self::Daemon { .. }
                | Self::Post { .. }
                | Self::Reindex { .. }
        )
    }
}

#[derive(Subcommand)]
pub enum PostOp {
    /// Deploy a new token
    Deploy {
        tick: String,
        max: String,
        lim: String,
    },
    /// Mint (tick and amount default to the profile's)
    Mint {
        tick: Option<String>,
        amt: Option<String>,
    },
    Transfer {
        tick: String,
        amt: String,
        to: String,
    },
    /// Link an EVM wallet to the agent
    Link { wallet: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration with keys masked
    Show,
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["moltmint", "run", "--profile", "claw", "--no-lock"])
            .expect("parse");
        assert_eq!(cli.profile.as_deref(), Some("claw"));
        assert!(cli.no_lock);
        assert!(matches!(
            cli.command,
            Commands::Run {
                max_cycles: None,
                target: None
            }
        ));
    }

    #[test]
    fn test_solve_requires_text_or_self_test() {
        assert!(Cli::try_parse_from(["moltmint", "solve"]).is_err());
        assert!(Cli::try_parse_from(["moltmint", "solve", "--self-test"]).is_ok());
        assert!(Cli::try_parse_from(["moltmint", "solve", "one plus one"]).is_ok());
    }

    #[test]
    fn test_post_mint_defaults() {
        let cli = Cli::try_parse_from(["moltmint", "post", "mint"]).expect("parse");
        match cli.command {
            Commands::Post {
                op: PostOp::Mint { tick, amt },
                target,
            } => {
                assert!(tick.is_none() && amt.is_none() && target.is_none());
            }
            _ => panic!("expected post mint"),
        }
    }

    #[test]
    fn test_history_logging_commands() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).expect("parse").command;
        assert!(parse(&["moltmint", "once"]).writes_history());
        assert!(parse(&["moltmint", "reindex", "--skip-indexed"]).writes_history());
        assert!(!parse(&["moltmint", "whoami"]).writes_history());
        assert!(!parse(&["moltmint", "solve", "--self-test"]).writes_history());
    }

    #[test]
    fn test_daemon_watch_pid() {
        let cli =
            Cli::try_parse_from(["moltmint", "daemon", "--watch-pid", "4242"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Daemon {
                watch_pid: Some(4242),
                ..
            }
        ));
    }
}
