//! Line scanners for the history log.
//!
//! The log is whatever the file logging layer appended over time, so every
//! scanner is line-based and skips anything it does not recognise.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

const JSON_ID_MARKER: &str = "\"id\": \"";
const POST_PATH_MARKER: &str = "/post/";
const INDEXER_TAG: &str = "[INDEXER]";
const INDEXED_MARKER: &str = "OK post_id=";
const ERROR_MARKER: &str = "ERROR post_id=";

/// Post ids mentioned anywhere in the log, either as a pretty-printed JSON
/// `"id": "<id>"` field or as a `/post/<id>` URL.
pub fn extract_post_ids(text: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains(JSON_ID_MARKER)
            && !line.contains(POST_PATH_MARKER)
            && let Some(id) = json_id(line)
        {
            ids.insert(id.to_string());
        }
        if let Some(id) = url_id(line) {
            ids.insert(id.to_string());
        }
    }
    ids
}

/// Ids with an `[INDEXER] OK post_id=<id>:` entry.
pub fn extract_indexed_ids(text: &str) -> BTreeSet<String> {
    extract_tagged(text, INDEXED_MARKER)
}

/// Ids with an `[INDEXER] ERROR post_id=<id>:` entry.
pub fn extract_error_ids(text: &str) -> BTreeSet<String> {
    extract_tagged(text, ERROR_MARKER)
}

pub fn read_post_ids(path: &Path) -> Result<BTreeSet<String>> {
    Ok(read_history(path)?
        .map(|text| extract_post_ids(&text))
        .unwrap_or_default())
}

pub fn read_indexed_ids(path: &Path) -> Result<BTreeSet<String>> {
    Ok(read_history(path)?
        .map(|text| extract_indexed_ids(&text))
        .unwrap_or_default())
}

pub fn read_error_ids(path: &Path) -> Result<BTreeSet<String>> {
    Ok(read_history(path)?
        .map(|text| extract_error_ids(&text))
        .unwrap_or_default())
}

/// `Ok(None)` when the file does not exist yet.
pub(crate) fn read_history(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        // Older logs may carry stray bytes from interrupted writes.
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read history log: {}", path.display()))
        }
    }
}

fn json_id(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once("\"id\":")?;
    let rest = rest.trim_start().strip_prefix('"')?;
    let (id, _) = rest.split_once('"')?;
    (!id.is_empty()).then_some(id)
}

fn url_id(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(POST_PATH_MARKER)?;
    let rest = rest.split('"').next()?;
    let id = rest.split_whitespace().next()?.trim_end_matches(',');
    (!id.is_empty()).then_some(id)
}

fn extract_tagged(text: &str, marker: &str) -> BTreeSet<String> {
    text.lines()
        .filter(|line| line.contains(INDEXER_TAG))
        .filter_map(|line| line.split_once(marker))
        .map(|(_, rest)| rest.split(':').next().unwrap_or_default().trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
