use anyhow::Result;
use clap::Parser;
use mint_config::MintSettings;

mod cli;
mod config_cmds;
mod live;
mod logging;
mod mint_cmds;
mod post_cmd;
mod reindex_cmd;
mod shutdown;
mod solve_cmd;
mod whoami_cmd;

use cli::{Cli, Commands};
use mint_cmds::{DaemonArgs, MintOverrides};
use reindex_cmd::ReindexArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init` must work before any config exists.
    if let Commands::Config { cmd } = &cli.command {
        logging::init(None)?;
        return config_cmds::handle_config(cmd, cli.config.as_deref());
    }

    let settings = MintSettings::load(cli.config.as_deref())?;
    let history_path = settings.history_path();
    let _log_guard = logging::init(
        cli.command
            .writes_history()
            .then_some(history_path.as_path()),
    )?;

    let profile = cli.profile.as_deref();
    match cli.command {
        Commands::Run { max_cycles, target } => {
            let overrides = MintOverrides { target, max_cycles };
            mint_cmds::handle_run(&settings, profile, overrides, cli.no_lock).await
        }
        Commands::Once { target } => {
            let overrides = MintOverrides {
                target,
                max_cycles: None,
            };
            mint_cmds::handle_once(&settings, profile, overrides, cli.no_lock).await
        }
        Commands::Daemon {
            watch_pid,
            max_cycles,
            first_start,
        } => {
            let args = DaemonArgs {
                watch_pid,
                max_cycles,
                first_start_minutes: first_start,
            };
            mint_cmds::handle_daemon(&settings, profile, args, cli.no_lock).await
        }
        Commands::Post { op, target } => {
            post_cmd::handle_post(&settings, profile, &op, target, cli.no_lock).await
        }
        Commands::Solve {
            self_test,
            challenge,
        } => solve_cmd::handle_solve(&settings, self_test, challenge).await,
        Commands::Reindex {
            skip_indexed,
            skip_errors,
            delay,
            history,
        } => {
            let args = ReindexArgs {
                skip_indexed,
                skip_errors,
                delay_secs: delay,
                history,
            };
            reindex_cmd::handle_reindex(&settings, args).await
        }
        Commands::Whoami => whoami_cmd::handle_whoami(&settings).await,
        Commands::Config { .. } => Ok(()),
    }
}
