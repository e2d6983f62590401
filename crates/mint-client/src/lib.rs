//! HTTP clients for the posting service (Moltbook) and the MBC-20 indexer.

pub mod indexer;
pub mod moltbook;

pub use indexer::{IndexError, IndexerClient, PostIndexer, SERVER_BUSY_MESSAGE};
pub use moltbook::MoltbookClient;
