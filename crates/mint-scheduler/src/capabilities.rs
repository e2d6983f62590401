use anyhow::Result;
use async_trait::async_trait;
use mint_core::{PublishResponse, VerifyOutcome};
use serde_json::Value;

/// Side effects a mint cycle needs. The live implementation talks to
/// Moltbook, the solver and the indexer; tests script a fake.
#[async_trait]
pub trait MintCapabilities: Send + Sync {
    /// Create a post. HTTP failures come back inside the response
    /// (`status == 0` for transport errors); `Err` means the request could
    /// not be attempted at all.
    async fn publish(&self, target: &str, title: &str, body: &str) -> Result<PublishResponse>;

    /// Answer a verification challenge, formatted with two decimals.
    async fn solve(&self, challenge: &str) -> Result<String>;

    async fn verify(&self, code: &str, answer: &str) -> Result<VerifyOutcome>;

    /// Ask the indexer to pick up a post. Failures are logged, never fatal.
    async fn index(&self, post_id: &str) -> Result<Value>;

    fn build_title(&self) -> String;

    fn description(&self) -> String;

    fn post_url(&self, post_id: &str) -> String {
        format!("https://www.moltbook.com/post/{post_id}")
    }
}
