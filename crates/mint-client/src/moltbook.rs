use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use mint_core::{AppError, PublishResponse, VerifyOutcome};
use serde_json::{Value, json};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.moltbook.com/api/v1";
const API_SUFFIX: &str = "/api/v1";
const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(15);
const PROFILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Moltbook posting API.
///
/// The API key can be swapped at runtime with [`MoltbookClient::set_api_key`];
/// a missing key only fails when a request is made.
#[derive(Debug)]
pub struct MoltbookClient {
    base_url: String,
    site_url: String,
    api_key: RwLock<Option<String>>,
    client: reqwest::Client,
    publish_timeout: Duration,
    verify_timeout: Duration,
}

impl MoltbookClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let site_url = base_url
            .strip_suffix(API_SUFFIX)
            .unwrap_or(&base_url)
            .to_string();
        Self {
            base_url,
            site_url,
            api_key: RwLock::new(api_key.filter(|key| !key.trim().is_empty())),
            client: reqwest::Client::new(),
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, publish: Duration, verify: Duration) -> Self {
        self.publish_timeout = publish;
        self.verify_timeout = verify;
        self
    }

    /// Replace (or clear) the API key used for subsequent requests.
    pub fn set_api_key(&self, api_key: Option<String>) -> Result<()> {
        let mut guard = self
            .api_key
            .write()
            .map_err(|_| anyhow!("moltbook api key lock poisoned"))?;
        *guard = api_key.filter(|key| !key.trim().is_empty());
        Ok(())
    }

    fn api_key(&self) -> Result<String> {
        let guard = self
            .api_key
            .read()
            .map_err(|_| anyhow!("moltbook api key lock poisoned"))?;
        guard
            .clone()
            .ok_or_else(|| AppError::MissingApiKey("MOLTBOOK_API_KEY").into())
    }

    /// Create a post in `submolt`.
    ///
    /// HTTP errors never raise: the status, the parsed body and the
    /// `retry_after_minutes` hint of a 429 are returned as data, and a
    /// transport failure or timeout becomes status 0. Only local problems
    /// (missing API key) are errors.
    pub async fn publish(
        &self,
        submolt: &str,
        title: &str,
        content: &str,
    ) -> Result<PublishResponse> {
        let api_key = self.api_key()?;
        let url = format!("{}/posts", self.base_url);
        debug!(%url, submolt_name = submolt, title, "publishing post");

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .timeout(self.publish_timeout)
            .json(&json!({
                "submolt_name": submolt,
                "title": title,
                "content": content,
            }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "publish request failed before a response");
                return Ok(PublishResponse::network_failure());
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, status, "failed to read publish response body");
                String::new()
            }
        };
        debug!(status, body = %text, "publish response");
        Ok(parse_publish_response(status, &text))
    }

    /// Submit a challenge answer. Accepted means a 2xx status; the
    /// diagnostic is `Status {code} {body}`.
    pub async fn verify(&self, verification_code: &str, answer: &str) -> Result<VerifyOutcome> {
        let api_key = self.api_key()?;
        let url = format!("{}/verify", self.base_url);
        debug!(verification_code, answer, "sending verification");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .timeout(self.verify_timeout)
            .json(&json!({
                "verification_code": verification_code,
                "answer": answer,
            }))
            .send()
            .await
            .context("verification request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read verification response body")?;
        Ok(VerifyOutcome {
            accepted: status.is_success(),
            diagnostic: format!("Status {} {}", status.as_u16(), text),
        })
    }

    /// Profile of the agent that owns the API key.
    pub async fn my_profile(&self) -> Result<Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/agents/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&api_key)
            .timeout(PROFILE_TIMEOUT)
            .send()
            .await
            .context("profile request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read profile response body")?;
        if !status.is_success() {
            bail!("profile request failed: status {status}, body {body}");
        }
        serde_json::from_str(&body).context("failed to parse profile response JSON")
    }

    pub fn post_url(&self, post_id: &str) -> String {
        format!("{}/post/{post_id}", self.site_url)
    }

    pub fn agent_profile_url(&self, agent_name: &str) -> String {
        format!("{}/u/{agent_name}", self.site_url)
    }
}

impl Default for MoltbookClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, None)
    }
}

/// Turn a raw publish status and body into a [`PublishResponse`].
fn parse_publish_response(status: u16, text: &str) -> PublishResponse {
    let body = serde_json::from_str::<Value>(text).ok();
    let retry_after_minutes = if status == 429 {
        body.as_ref().and_then(retry_after_minutes)
    } else {
        None
    };
    PublishResponse {
        body,
        status,
        retry_after_minutes,
    }
}

/// `retry_after_minutes` as a number or numeric string.
fn retry_after_minutes(body: &Value) -> Option<f64> {
    match body.get("retry_after_minutes")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
