use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_TOKENS: u32 = 16;

const SYSTEM_PROMPT: &str = "You are a precise arithmetic solver for noisy lobster puzzles.";

const PUZZLE_INSTRUCTIONS: &str = "\
You are a precise arithmetic solver for short, noisy lobster puzzles.
The text is noisy (random capitalization, weird symbols: ^ ~ | < > [ ] etc.).
Rules:
- Ignore ALL symbols that are not letters, digits or spaces.
- Convert any number words (like 'thirty two', 'tWeLvE', 'fifteen') to integers.
- The puzzle may describe:
  (A) a base value and a change (increase or decrease), OR
  (B) two forces/amounts and ask for NET or TOTAL force.
- Words like 'exerts', 'has', 'walks at', 'swims at' give base values.
- Words like 'adds', 'gains', 'increases by', 'speeds up by', 'picks up', 'accelerates by' mean you ADD.
- Words like 'loses', 'reduces by', 'slows down by' mean you SUBTRACT.
- If it asks for NET or TOTAL force between two opposing forces, subtract the smaller from the larger.
- If there is only one number, just return that number.
- If the result is an integer, still format it with exactly 2 decimal places.
- Return ONLY the final numeric answer with exactly 2 decimal places. Use a dot as decimal separator.
- Never explain your reasoning. Never output anything except the number.
";

/// Remote fallback for puzzles the rule parser cannot handle.
#[async_trait]
pub trait PuzzleLlm: Send + Sync {
    /// Raw answer text (first line of the model reply).
    async fn ask(&self, challenge: &str) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Debug)]
pub struct ChatCompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
    max_attempts: u32,
}

impl ChatCompletionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_once(&self, challenge: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": user_prompt(challenge)}
                ],
                "temperature": 0,
                "max_tokens": MAX_TOKENS
            }))
            .send()
            .await
            .with_context(|| format!("puzzle llm request failed for model {}", self.model))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read completion response body")?;
        if !status.is_success() {
            bail!("puzzle llm returned status {status}, body {body}");
        }

        let answer = first_line(&parse_completion_content(&body)?);
        let id = completion_id(&body);
        debug!(id = %id, answer = %answer, "[OpenAI] completion");
        Ok(answer)
    }
}

#[async_trait]
impl PuzzleLlm for ChatCompletionClient {
    async fn ask(&self, challenge: &str) -> Result<String> {
        with_retries(self.max_attempts, INITIAL_BACKOFF, |attempt| {
            debug!(attempt, max = self.max_attempts, model = %self.model, "puzzle llm call");
            self.request_once(challenge)
        })
        .await
    }
}

/// Run `op` up to `max_attempts` times, sleeping `initial_backoff` after the
/// first failure and doubling it after each further one. The last error is
/// returned once attempts run out.
pub async fn with_retries<T, F, Fut>(
    max_attempts: u32,
    initial_backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut backoff = initial_backoff;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(err.context(format!("giving up after {attempt} attempts")));
            }
            Err(err) => {
                warn!(attempt, error = %err, "puzzle llm attempt failed");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}

fn user_prompt(challenge: &str) -> String {
    format!("{PUZZLE_INSTRUCTIONS}\nPuzzle text:\n{challenge}\nAnswer:")
}

fn first_line(content: &str) -> String {
    content
        .trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn completion_id(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("id").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_completion_content(body: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(body).context("failed to parse completion response JSON")?;
    value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing choices[0].message.content in completion response"))
}
