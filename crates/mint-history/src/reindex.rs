//! Bulk re-submission of logged posts to the indexer.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use mint_client::{IndexError, PostIndexer};
use tracing::{info, warn};

use crate::parse::{extract_error_ids, extract_indexed_ids, extract_post_ids, read_history};

pub const DEFAULT_REINDEX_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct ReindexOptions {
    /// Pause between two indexer calls.
    pub delay: Duration,
    pub skip_already_indexed: bool,
    pub skip_previous_errors: bool,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_REINDEX_DELAY,
            skip_already_indexed: false,
            skip_previous_errors: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReindexReport {
    pub indexed: usize,
    pub errors: usize,
    /// Ids selected for indexing after the skip filters.
    pub total: usize,
    /// Human-readable progress, one entry per post plus any summary notes.
    pub lines: Vec<String>,
    pub server_busy: bool,
}

impl ReindexReport {
    fn note(line: &str) -> Self {
        Self {
            lines: vec![line.to_string()],
            ..Self::default()
        }
    }
}

/// Index every post id found in the history log at `path`, in sorted order.
///
/// A busy indexer ends the batch early. Other per-post failures are counted
/// and the batch moves on. Only an unreadable (but existing) log is an error.
pub async fn reindex_from_history<I>(
    indexer: &I,
    path: &Path,
    options: &ReindexOptions,
) -> Result<ReindexReport>
where
    I: PostIndexer + ?Sized,
{
    let Some(text) = read_history(path)? else {
        return Ok(ReindexReport::note("History file not found."));
    };

    let mut ids = extract_post_ids(&text);
    if ids.is_empty() {
        return Ok(ReindexReport::note("No post IDs found in history."));
    }
    if options.skip_already_indexed {
        let done = extract_indexed_ids(&text);
        ids.retain(|id| !done.contains(id));
    }
    if options.skip_previous_errors {
        let failed = extract_error_ids(&text);
        ids.retain(|id| !failed.contains(id));
    }
    if ids.is_empty() {
        return Ok(ReindexReport::note("Nothing to index."));
    }

    let mut report = ReindexReport {
        total: ids.len(),
        ..ReindexReport::default()
    };
    info!(
        "[INDEXER] Reindexing {} posts from {}",
        report.total,
        path.display()
    );

    for (n, post_id) in ids.iter().enumerate() {
        match indexer.index_post(post_id).await {
            Ok(resp) => {
                info!("[INDEXER] OK post_id={post_id}: {resp}");
                report.lines.push(format!("OK post_id={post_id}: {resp}"));
                report.indexed += 1;
            }
            Err(IndexError::Busy(resp)) => {
                warn!("[INDEXER] SERVER BUSY for post_id={post_id}: {resp}");
                report
                    .lines
                    .push(format!("SERVER BUSY for post_id={post_id}: {resp}"));
                report.server_busy = true;
                break;
            }
            Err(err) => {
                warn!("[INDEXER] ERROR post_id={post_id}: {err}");
                report.lines.push(format!("ERROR post_id={post_id}: {err}"));
                report.errors += 1;
            }
        }

        if n + 1 < report.total {
            tokio::time::sleep(options.delay).await;
        }
    }

    if report.server_busy {
        report
            .lines
            .push("Stopped indexing because server is busy. Please try again later.".to_string());
    }
    Ok(report)
}

#[cfg(test)]
#[path = "reindex_tests.rs"]
mod tests;
