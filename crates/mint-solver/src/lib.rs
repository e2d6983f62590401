//! Solver for the arithmetic "lobster" puzzles Moltbook attaches to new
//! posts: a deterministic rule parser first, an OpenAI-compatible model as
//! fallback, with an answer cache keyed by the cleaned puzzle text.

pub mod cache;
pub mod llm;
pub mod normalize;
pub mod rules;
pub mod selftest;
pub mod solver;

pub use cache::AnswerCache;
pub use llm::{ChatCompletionClient, PuzzleLlm};
pub use normalize::{clean_challenge, extract_numbers};
pub use rules::rule_based;
pub use selftest::{SELF_TEST_CHALLENGES, SelfTestResult, run_self_test};
pub use solver::{ChallengeVerifier, PuzzleSolver, format_answer};
