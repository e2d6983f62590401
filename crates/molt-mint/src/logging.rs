//! Subscriber setup: human-readable stderr output, plus an ANSI-free copy
//! appended to the history log for commands that mint or index.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Open `history_path` for appending through a non-blocking writer.
///
/// The guard flushes pending lines on drop and must outlive all logging.
pub(crate) fn history_writer(history_path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = match history_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create history directory: {}", dir.display()))?;
    let file_name = history_path
        .file_name()
        .with_context(|| format!("History path has no file name: {}", history_path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. With a history path the returned guard
/// must be held until the command finishes.
pub(crate) fn init(history_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match history_path {
        Some(path) => {
            let (writer, guard) = history_writer(path)?;
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .ok();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(stderr_layer)
                .try_init()
                .ok();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_history_writer_creates_parent_dirs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("state").join("mbc20_history.log");
        let (writer, guard) = history_writer(&path).expect("writer");
        drop(writer);
        drop(guard);
        assert!(path.parent().is_some_and(Path::is_dir));
    }

    #[test]
    fn test_history_writer_appends() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("mbc20_history.log");
        std::fs::write(&path, "earlier line\n").expect("seed history");

        let (mut writer, guard) = history_writer(&path).expect("writer");
        writer
            .write_all(b"[AUTO-MINT] Post URL: https://www.moltbook.com/post/abc\n")
            .expect("write");
        drop(writer);
        drop(guard);

        let contents = std::fs::read_to_string(&path).expect("read history");
        assert!(contents.starts_with("earlier line\n"));
        assert!(contents.contains("/post/abc"));
    }

    #[test]
    fn test_history_writer_rejects_directory_without_name() {
        assert!(history_writer(Path::new("/")).is_err());
    }
}
