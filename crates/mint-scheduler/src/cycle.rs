use std::time::Duration;

use mint_core::{MintConfig, PublishResponse, build_post_body};
use tracing::{debug, info, warn};

use crate::capabilities::MintCapabilities;
use crate::outcome::{CycleFailure, CycleOutcome, FailureKind, MintReceipt};

/// Pause between a successful mint and the indexer call, giving Moltbook
/// time to publish the post.
pub const INDEX_DELAY: Duration = Duration::from_secs(10);

/// One publish → (solve → verify) → index attempt.
///
/// Any failure aborts the rest of the cycle. Indexing runs only after a
/// successful mint and never changes the outcome.
pub async fn run_cycle<C>(caps: &C, config: &MintConfig) -> CycleOutcome
where
    C: MintCapabilities + ?Sized,
{
    let inscription = match config.inscription() {
        Ok(inscription) => inscription,
        Err(err) => {
            return CycleOutcome::Failed(CycleFailure::new(
                FailureKind::Validation,
                err.to_string(),
            ));
        }
    };
    let inscription_json = inscription.to_compact_json();
    let body = build_post_body(&caps.description(), &inscription_json);
    let title = caps.build_title();
    let target = config.normalized_target();

    info!(
        "[AUTO-MINT] Creating post in '{target}' title='{title}' inscription={inscription_json}"
    );

    let response = match caps.publish(&target, &title, &body).await {
        Ok(response) => response,
        Err(err) => {
            return CycleOutcome::Failed(CycleFailure::new(
                FailureKind::Validation,
                format!("publish not attempted: {err:#}"),
            ));
        }
    };

    if let Some(outcome) = classify_publish(&response) {
        return outcome;
    }
    debug!(body = ?response.body, "[AUTO-MINT] Post response");

    let Some(post_id) = response.post_id() else {
        return CycleOutcome::Failed(
            CycleFailure::new(
                FailureKind::Validation,
                "Post created but missing post id in response",
            )
            .with_status(response.status),
        );
    };
    info!("[AUTO-MINT] Post URL: {}", caps.post_url(&post_id));

    let verified = match response.challenge() {
        None => {
            info!("[AUTO-MINT] No verification required.");
            false
        }
        Some(challenge) => {
            info!(
                "[AUTO-MINT] Verification required. Code={} Expires={}\nChallenge:\n{}",
                challenge.code,
                challenge.expires_at.as_deref().unwrap_or("unknown"),
                challenge.text
            );
            let answer = match caps.solve(&challenge.text).await {
                Ok(answer) => answer,
                Err(err) => {
                    return CycleOutcome::Failed(CycleFailure::new(
                        FailureKind::Solver,
                        format!("{err:#}"),
                    ));
                }
            };
            info!("[AUTO-MINT] Solver answer: {answer}");

            match caps.verify(&challenge.code, &answer).await {
                Ok(outcome) if outcome.accepted => {
                    info!("[AUTO-MINT] Verify response: {}", outcome.diagnostic);
                    true
                }
                Ok(outcome) => {
                    return CycleOutcome::Failed(CycleFailure::new(
                        FailureKind::VerificationFailed,
                        outcome.diagnostic,
                    ));
                }
                Err(err) => {
                    return CycleOutcome::Failed(CycleFailure::new(
                        FailureKind::VerificationFailed,
                        format!("verify request failed: {err:#}"),
                    ));
                }
            }
        }
    };

    info!(
        "[AUTO-MINT] [INDEXER] Will index post_id={post_id} in {} seconds.",
        INDEX_DELAY.as_secs()
    );
    tokio::time::sleep(INDEX_DELAY).await;
    let indexed = match caps.index(&post_id).await {
        Ok(resp) => {
            info!("[AUTO-MINT] [INDEXER] OK post_id={post_id}: {resp}");
            true
        }
        Err(err) => {
            warn!("[AUTO-MINT] [INDEXER] ERROR post_id={post_id}: {err:#}");
            false
        }
    };

    CycleOutcome::Success(MintReceipt {
        post_id,
        verified,
        indexed,
    })
}

/// Single attempt for externally scheduled runs (cron, process managers).
pub async fn run_cycle_once<C>(caps: &C, config: &MintConfig) -> Result<MintReceipt, FailureKind>
where
    C: MintCapabilities + ?Sized,
{
    match run_cycle(caps, config).await {
        CycleOutcome::Success(receipt) => Ok(receipt),
        CycleOutcome::RateLimited { .. } => Err(FailureKind::RateLimited),
        CycleOutcome::Failed(failure) => Err(failure.kind),
    }
}

/// Map a non-successful publish to its outcome. `None` means the post was
/// created.
fn classify_publish(response: &PublishResponse) -> Option<CycleOutcome> {
    let status = response.status;
    if response.is_network_failure() {
        return Some(CycleOutcome::Failed(CycleFailure::new(
            FailureKind::Network,
            "Moltbook timeout or network error",
        )));
    }
    if status == 429 {
        let retry_after = response
            .retry_after_minutes
            .filter(|minutes| minutes.is_finite() && *minutes > 0.0)
            .map(|minutes| Duration::try_from_secs_f64(minutes * 60.0).unwrap_or(Duration::MAX));
        return Some(CycleOutcome::RateLimited { retry_after });
    }
    if response.is_success() {
        return None;
    }
    let kind = if (500..600).contains(&status) {
        FailureKind::ServerError
    } else {
        FailureKind::ClientError
    };
    Some(CycleOutcome::Failed(
        CycleFailure::new(kind, format!("Moltbook POST failed with status {status}"))
            .with_status(status),
    ))
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
