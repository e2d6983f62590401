use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mint_client::MoltbookClient;
use mint_core::{AppError, VerifyOutcome};
use tracing::{info, warn};

use crate::cache::AnswerCache;
use crate::llm::PuzzleLlm;
use crate::rules::rule_based;

/// Anything that can check an answer against a verification code.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    async fn verify(&self, code: &str, answer: &str) -> Result<VerifyOutcome>;
}

#[async_trait]
impl ChallengeVerifier for MoltbookClient {
    async fn verify(&self, code: &str, answer: &str) -> Result<VerifyOutcome> {
        MoltbookClient::verify(self, code, answer).await
    }
}

/// Two-tier puzzle solver. Answers are always formatted with two decimals.
pub struct PuzzleSolver {
    llm: Option<Arc<dyn PuzzleLlm>>,
    cache: AnswerCache,
    llm_only: bool,
}

impl std::fmt::Debug for PuzzleSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleSolver")
            .field("llm", &self.llm.is_some())
            .field("cache_entries", &self.cache.len())
            .field("llm_only", &self.llm_only)
            .finish()
    }
}

impl PuzzleSolver {
    /// Without an LLM, puzzles the rule parser rejects fail with a missing
    /// `OPENAI_API_KEY` error.
    pub fn new(llm: Option<Arc<dyn PuzzleLlm>>) -> Self {
        Self {
            llm,
            cache: AnswerCache::new(),
            llm_only: false,
        }
    }

    pub fn with_llm_only(mut self, llm_only: bool) -> Self {
        self.llm_only = llm_only;
        self
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    pub async fn solve(&self, challenge: &str) -> Result<String> {
        if !self.llm_only {
            if let Some(value) = rule_based(challenge) {
                info!(result = value, "[RULE] using deterministic result");
                return Ok(format_answer(value));
            }
            info!("[RULE] parser returned None, using LLM with cache");
        }
        self.ask_llm(challenge, true).await
    }

    /// Solve, verify, and on rejection ask the model once more (bypassing
    /// the cache) and verify that answer. Returns the last answer sent and
    /// its verification outcome.
    pub async fn solve_and_verify<V>(
        &self,
        challenge: &str,
        code: &str,
        verifier: &V,
    ) -> Result<(String, VerifyOutcome)>
    where
        V: ChallengeVerifier + ?Sized,
    {
        let answer = self.solve(challenge).await?;
        info!(answer = %answer, "[SOLVER] First attempt, verifying");
        let first = verifier.verify(code, &answer).await?;
        if first.accepted {
            info!("[SOLVER] First attempt SUCCESS");
            return Ok((answer, first));
        }

        warn!(diagnostic = %first.diagnostic, "[SOLVER] First attempt FAILED, retrying with LLM (bypassing cache)");
        self.cache.remove(challenge);
        let retry = match self.ask_llm(challenge, false).await {
            Ok(retry) => retry,
            Err(err) => {
                warn!(error = %err, "[SOLVER] Retry could not produce an answer");
                return Ok((answer, first));
            }
        };

        info!(answer = %retry, "[SOLVER] Retry answer, verifying again");
        let second = verifier.verify(code, &retry).await?;
        if second.accepted {
            info!("[SOLVER] Retry SUCCESS");
            self.cache.insert(challenge, &retry);
        } else {
            warn!(diagnostic = %second.diagnostic, "[SOLVER] Retry also FAILED, giving up");
        }
        Ok((retry, second))
    }

    async fn ask_llm(&self, challenge: &str, use_cache: bool) -> Result<String> {
        if use_cache && let Some(cached) = self.cache.get(challenge) {
            info!(answer = %cached, "[CACHE HIT] returning cached answer");
            return Ok(cached);
        }

        let llm = self
            .llm
            .as_ref()
            .ok_or(AppError::MissingApiKey("OPENAI_API_KEY"))?;
        let raw = llm.ask(challenge).await?;
        let answer = parse_numeric_answer(&raw)?;
        if use_cache {
            self.cache.insert(challenge, &answer);
            let key = AnswerCache::key(challenge);
            info!(key = %&key[..8], answer = %answer, "[CACHE SAVE]");
        }
        Ok(answer)
    }
}

/// Fixed two-decimal rendering (`30` -> `30.00`).
pub fn format_answer(value: f64) -> String {
    format!("{value:.2}")
}

fn parse_numeric_answer(raw: &str) -> Result<String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(format_answer)
        .ok_or_else(|| anyhow!("AI answer is not numeric: {raw:?}"))
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
