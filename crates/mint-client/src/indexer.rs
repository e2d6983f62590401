//! MBC-20 indexer: asks mbc20.xyz to pick up a freshly minted post.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_INDEX_URL: &str = "https://mbc20.xyz/api/index-post";
/// Error string the indexer returns when it is overloaded.
pub const SERVER_BUSY_MESSAGE: &str = "Server busy, retry later";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const BROWSER_REFERER: &str = "https://mbc20.xyz/";

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The indexer asked callers to back off; batch jobs should stop.
    #[error("indexer busy: {0}")]
    Busy(Value),

    #[error("indexer returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("indexer request failed: {0}")]
    Transport(String),

    #[error("indexer returned invalid JSON: {0}")]
    Decode(String),
}

impl IndexError {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Anything that can index a single post. Lets batch reindexing run against
/// a fake in tests.
#[async_trait]
pub trait PostIndexer: Send + Sync {
    async fn index_post(&self, post_id: &str) -> Result<Value, IndexError>;
}

#[derive(Debug, Clone)]
pub struct IndexerClient {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl IndexerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
        headers
    }
}

impl Default for IndexerClient {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_URL)
    }
}

#[async_trait]
impl PostIndexer for IndexerClient {
    /// `GET <url>?id=<post_id>` with browser-like headers.
    async fn index_post(&self, post_id: &str) -> Result<Value, IndexError> {
        let url = Url::parse_with_params(&self.url, [("id", post_id)])
            .map_err(|err| IndexError::Transport(format!("invalid indexer url: {err}")))?;
        debug!(%url, "indexing post");

        let response = self
            .client
            .get(url)
            .headers(Self::browser_headers())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| IndexError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| IndexError::Transport(err.to_string()))?;
        classify_response(status, &text)
    }
}

/// Map an indexer status and body to the call result. The busy marker wins
/// over the status code.
fn classify_response(status: u16, text: &str) -> Result<Value, IndexError> {
    let parsed = serde_json::from_str::<Value>(text);
    if let Ok(value) = &parsed
        && is_busy(value)
    {
        return Err(IndexError::Busy(value.clone()));
    }
    if !(200..300).contains(&status) {
        return Err(IndexError::Http {
            status,
            body: text.to_string(),
        });
    }
    parsed.map_err(|err| IndexError::Decode(err.to_string()))
}

fn is_busy(value: &Value) -> bool {
    value.get("error").and_then(Value::as_str) == Some(SERVER_BUSY_MESSAGE)
}
