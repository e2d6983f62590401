//! Shared domain types for the auto-mint workspace: targets, inscriptions,
//! post bodies, publish/verify values and the title builder.

pub mod error;
pub mod inscription;
pub mod publish;
pub mod title;
pub mod types;

pub use error::AppError;
pub use inscription::{Inscription, build_post_body};
pub use publish::{Challenge, PublishResponse, VerifyOutcome};
pub use title::TitleBuilder;
pub use types::{DEFAULT_TARGET, MintConfig, normalize_target};
