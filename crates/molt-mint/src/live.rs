//! Production wiring of the scheduler's capabilities.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use mint_client::{IndexerClient, MoltbookClient, PostIndexer};
use mint_config::{MintSettings, ProfileConfig};
use mint_core::{PublishResponse, TitleBuilder, VerifyOutcome};
use mint_scheduler::MintCapabilities;
use mint_solver::{ChatCompletionClient, PuzzleLlm, PuzzleSolver};
use serde_json::Value;
use tracing::warn;

pub(crate) fn moltbook_client(settings: &MintSettings) -> MoltbookClient {
    MoltbookClient::new(
        settings.moltbook.base_url.clone(),
        settings.moltbook_api_key().map(str::to_string),
    )
    .with_timeouts(
        Duration::from_secs(settings.moltbook.publish_timeout_secs),
        Duration::from_secs(settings.moltbook.verify_timeout_secs),
    )
}

pub(crate) fn indexer_client(settings: &MintSettings) -> IndexerClient {
    IndexerClient::new(settings.indexer.url.clone())
        .with_timeout(Duration::from_secs(settings.indexer.timeout_secs))
}

/// Rule parser first, then the configured model. Without an OpenAI key the
/// solver still handles every puzzle the rule parser understands.
pub(crate) fn puzzle_solver(settings: &MintSettings) -> PuzzleSolver {
    let llm = settings.solver_api_key().map(|key| {
        let client = ChatCompletionClient::new(
            settings.solver.base_url.clone(),
            key,
            settings.solver.model.clone(),
        )
        .with_timeout(Duration::from_secs(settings.solver.timeout_secs))
        .with_max_attempts(settings.solver.max_attempts);
        Arc::new(client) as Arc<dyn PuzzleLlm>
    });
    if llm.is_none() {
        warn!("OPENAI_API_KEY not set; only rule-based puzzles can be solved");
    }
    PuzzleSolver::new(llm).with_llm_only(settings.solver.llm_only)
}

pub(crate) struct LiveCapabilities {
    moltbook: MoltbookClient,
    solver: PuzzleSolver,
    indexer: IndexerClient,
    titles: TitleBuilder,
    description: String,
}

impl LiveCapabilities {
    pub(crate) fn new(settings: &MintSettings, profile: &ProfileConfig) -> Self {
        Self {
            moltbook: moltbook_client(settings),
            solver: puzzle_solver(settings),
            indexer: indexer_client(settings),
            titles: TitleBuilder::new(&profile.title, &profile.agent_label),
            description: profile.description.clone(),
        }
    }
}

#[async_trait]
impl MintCapabilities for LiveCapabilities {
    async fn publish(&self, target: &str, title: &str, body: &str) -> Result<PublishResponse> {
        self.moltbook.publish(target, title, body).await
    }

    async fn solve(&self, challenge: &str) -> Result<String> {
        self.solver.solve(challenge).await
    }

    async fn verify(&self, code: &str, answer: &str) -> Result<VerifyOutcome> {
        self.moltbook.verify(code, answer).await
    }

    async fn index(&self, post_id: &str) -> Result<Value> {
        Ok(self.indexer.index_post(post_id).await?)
    }

    fn build_title(&self) -> String {
        self.titles.build()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn post_url(&self, post_id: &str) -> String {
        self.moltbook.post_url(post_id)
    }
}
