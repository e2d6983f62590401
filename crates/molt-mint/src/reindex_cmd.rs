use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use mint_config::MintSettings;
use mint_history::{ReindexOptions, reindex_from_history};

use crate::live;

pub(crate) struct ReindexArgs {
    pub skip_indexed: bool,
    pub skip_errors: bool,
    pub delay_secs: Option<f64>,
    pub history: Option<PathBuf>,
}

fn reindex_options(settings: &MintSettings, args: &ReindexArgs) -> Result<ReindexOptions> {
    let delay_secs = args
        .delay_secs
        .unwrap_or(settings.indexer.reindex_delay_secs);
    let delay = Duration::try_from_secs_f64(delay_secs)
        .with_context(|| format!("Invalid reindex delay: {delay_secs} seconds"))?;
    Ok(ReindexOptions {
        delay,
        skip_already_indexed: args.skip_indexed,
        skip_previous_errors: args.skip_errors,
    })
}

pub(crate) async fn handle_reindex(settings: &MintSettings, args: ReindexArgs) -> Result<()> {
    let options = reindex_options(settings, &args)?;
    let path = args.history.unwrap_or_else(|| settings.history_path());
    let indexer = live::indexer_client(settings);

    let report = reindex_from_history(&indexer, &path, &options).await?;
    for line in &report.lines {
        println!("{line}");
    }
    if report.total > 0 {
        eprintln!(
            "Indexed {} of {} posts ({} errors){}",
            report.indexed,
            report.total,
            report.errors,
            if report.server_busy {
                ", stopped early: indexer busy"
            } else {
                ""
            }
        );
    }
    Ok(())
}
