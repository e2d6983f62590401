//! The mint history log: pulling post ids back out of it and re-submitting
//! them to the indexer in bulk.

pub mod parse;
pub mod reindex;

pub use parse::{
    extract_error_ids, extract_indexed_ids, extract_post_ids, read_error_ids, read_indexed_ids,
    read_post_ids,
};
pub use reindex::{DEFAULT_REINDEX_DELAY, ReindexOptions, ReindexReport, reindex_from_history};
