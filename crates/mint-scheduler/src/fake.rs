//! Scripted [`MintCapabilities`] for tests and dry runs.
//!
//! Each capability pops its next scripted reply; an empty script falls back
//! to a happy-path default (post created without a challenge, answer
//! accepted, index OK). Every call is recorded in order.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mint_core::{PublishResponse, VerifyOutcome};
use serde_json::{Value, json};

use crate::capabilities::MintCapabilities;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Publish {
        target: String,
        title: String,
        body: String,
    },
    Solve(String),
    Verify {
        code: String,
        answer: String,
    },
    Index(String),
}

/// Scripted reply. Errors are stored as text because `anyhow::Error` is not
/// `Clone`.
type Scripted<T> = Result<T, String>;

#[derive(Debug, Default)]
pub struct FakeCapabilities {
    publish: Mutex<VecDeque<Scripted<PublishResponse>>>,
    solve: Mutex<VecDeque<Scripted<String>>>,
    verify: Mutex<VecDeque<Scripted<VerifyOutcome>>>,
    index: Mutex<VecDeque<Scripted<Value>>>,
    calls: Mutex<Vec<FakeCall>>,
    next_post: AtomicU32,
    title: String,
    description: String,
}

impl FakeCapabilities {
    pub fn new() -> Self {
        Self {
            title: "MBC-20 inscription [fake]".to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn push_publish(&self, response: PublishResponse) -> &Self {
        push(&self.publish, Ok(response));
        self
    }

    pub fn push_publish_error(&self, message: &str) -> &Self {
        push(&self.publish, Err(message.to_string()));
        self
    }

    pub fn push_solve(&self, answer: Scripted<&str>) -> &Self {
        push(&self.solve, answer.map(str::to_string));
        self
    }

    pub fn push_verify(&self, accepted: bool, diagnostic: &str) -> &Self {
        push(
            &self.verify,
            Ok(VerifyOutcome {
                accepted,
                diagnostic: diagnostic.to_string(),
            }),
        );
        self
    }

    pub fn push_verify_error(&self, message: &str) -> &Self {
        push(&self.verify, Err(message.to_string()));
        self
    }

    pub fn push_index(&self, reply: Scripted<Value>) -> &Self {
        push(&self.index, reply);
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn publish_count(&self) -> usize {
        self.count(|call| matches!(call, FakeCall::Publish { .. }))
    }

    pub fn verify_count(&self) -> usize {
        self.count(|call| matches!(call, FakeCall::Verify { .. }))
    }

    pub fn index_count(&self) -> usize {
        self.count(|call| matches!(call, FakeCall::Index(_)))
    }

    fn count(&self, pred: impl Fn(&FakeCall) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    fn record(&self, call: FakeCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// 201 with `post.id` and no challenge.
    pub fn created(post_id: &str) -> PublishResponse {
        PublishResponse {
            body: Some(json!({"success": true, "post": {"id": post_id}})),
            status: 201,
            retry_after_minutes: None,
        }
    }

    /// 201 with a challenge in the current response shape.
    pub fn created_with_challenge(post_id: &str, code: &str, text: &str) -> PublishResponse {
        PublishResponse {
            body: Some(json!({
                "success": true,
                "post": {
                    "id": post_id,
                    "verification": {
                        "verification_code": code,
                        "challenge_text": text,
                        "expires_at": "2026-01-01T00:05:00Z"
                    }
                }
            })),
            status: 201,
            retry_after_minutes: None,
        }
    }

    pub fn rate_limited(retry_after_minutes: Option<f64>) -> PublishResponse {
        PublishResponse {
            body: Some(json!({"error": "Too many requests"})),
            status: 429,
            retry_after_minutes,
        }
    }

    pub fn status(status: u16, body: Value) -> PublishResponse {
        PublishResponse {
            body: Some(body),
            status,
            retry_after_minutes: None,
        }
    }
}

fn push<T>(queue: &Mutex<VecDeque<T>>, item: T) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(item);
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().ok().and_then(|mut queue| queue.pop_front())
}

#[async_trait]
impl MintCapabilities for FakeCapabilities {
    async fn publish(&self, target: &str, title: &str, body: &str) -> Result<PublishResponse> {
        self.record(FakeCall::Publish {
            target: target.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        match pop(&self.publish) {
            Some(reply) => reply.map_err(|msg| anyhow!(msg)),
            None => {
                let n = self.next_post.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Self::created(&format!("post-{n}")))
            }
        }
    }

    async fn solve(&self, challenge: &str) -> Result<String> {
        self.record(FakeCall::Solve(challenge.to_string()));
        pop(&self.solve)
            .unwrap_or_else(|| Ok("0.00".to_string()))
            .map_err(|msg| anyhow!(msg))
    }

    async fn verify(&self, code: &str, answer: &str) -> Result<VerifyOutcome> {
        self.record(FakeCall::Verify {
            code: code.to_string(),
            answer: answer.to_string(),
        });
        pop(&self.verify)
            .unwrap_or_else(|| {
                Ok(VerifyOutcome {
                    accepted: true,
                    diagnostic: "Status 200 {}".to_string(),
                })
            })
            .map_err(|msg| anyhow!(msg))
    }

    async fn index(&self, post_id: &str) -> Result<Value> {
        self.record(FakeCall::Index(post_id.to_string()));
        pop(&self.index)
            .unwrap_or_else(|| Ok(json!({"ok": true})))
            .map_err(|msg| anyhow!(msg))
    }

    fn build_title(&self) -> String {
        self.title.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
