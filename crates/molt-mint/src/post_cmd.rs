//! `post`: publish a single inscription of any kind, outside the scheduler.

use anyhow::{Context, Result, bail};
use mint_client::PostIndexer;
use mint_config::{MintSettings, ProfileConfig};
use mint_core::{Inscription, TitleBuilder, build_post_body, normalize_target};
use mint_scheduler::INDEX_DELAY;
use tracing::{info, warn};

use crate::cli::PostOp;
use crate::live;
use crate::mint_cmds::{require_moltbook_key, take_lock};

/// The named profile, or defaults when no profile was asked for and none is
/// configured.
fn post_profile(settings: &MintSettings, name: Option<&str>) -> Result<ProfileConfig> {
    match settings.profile(name) {
        Ok(profile) => Ok(profile.clone()),
        Err(_) if name.is_none() => Ok(ProfileConfig::default()),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn build_inscription(op: &PostOp, profile: &ProfileConfig) -> Result<Inscription> {
    let inscription = match op {
        PostOp::Deploy { tick, max, lim } => Inscription::deploy(tick, max, lim)?,
        PostOp::Mint { tick, amt } => Inscription::mint(
            tick.as_deref().unwrap_or(&profile.tick),
            amt.as_deref().unwrap_or(&profile.amt),
        )?,
        PostOp::Transfer { tick, amt, to } => Inscription::transfer(tick, amt, to)?,
        PostOp::Link { wallet } => Inscription::link(wallet)?,
    };
    Ok(inscription)
}

pub(crate) async fn handle_post(
    settings: &MintSettings,
    profile: Option<&str>,
    op: &PostOp,
    target: Option<String>,
    no_lock: bool,
) -> Result<()> {
    let profile = post_profile(settings, profile)?;
    let inscription = build_inscription(op, &profile)?;
    require_moltbook_key(settings)?;
    let _lock = take_lock(no_lock, &format!("post {}", inscription.op()))?;

    let target = normalize_target(target.as_deref().unwrap_or(&profile.target));
    let title = TitleBuilder::new(&profile.title, &profile.agent_label).build();
    let inscription_json = inscription.to_compact_json();
    let body = build_post_body(&profile.description, &inscription_json);
    info!("[POST] Creating post in '{target}' title='{title}' inscription={inscription_json}");

    let moltbook = live::moltbook_client(settings);
    let response = moltbook.publish(&target, &title, &body).await?;
    if response.status == 429 {
        match response.retry_after_minutes {
            Some(minutes) => bail!("Rate limited by Moltbook, retry in {minutes} minutes"),
            None => bail!("Rate limited by Moltbook"),
        }
    }
    if !response.is_success() {
        let detail = response
            .body
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        bail!("Publish failed with status {}: {detail}", response.status);
    }

    let post_id = response
        .post_id()
        .context("Publish succeeded but the response carries no post id")?;
    let post_url = moltbook.post_url(&post_id);
    info!("[POST] Post URL: {post_url}");

    if let Some(challenge) = response.challenge() {
        info!(
            "[POST] Verification required. Code={} Expires={}",
            challenge.code,
            challenge.expires_at.as_deref().unwrap_or("-")
        );
        let solver = live::puzzle_solver(settings);
        let (answer, outcome) = solver
            .solve_and_verify(&challenge.text, &challenge.code, &moltbook)
            .await?;
        if !outcome.accepted {
            bail!(
                "Verification failed for post {post_id} (answer {answer}): {}",
                outcome.diagnostic
            );
        }
        info!("[POST] Verified with answer {answer}");
    }

    info!(
        "[POST] [INDEXER] Will index post_id={post_id} in {} seconds.",
        INDEX_DELAY.as_secs()
    );
    tokio::time::sleep(INDEX_DELAY).await;
    match live::indexer_client(settings).index_post(&post_id).await {
        Ok(resp) => info!("[POST] [INDEXER] OK post_id={post_id}: {resp}"),
        Err(err) => warn!("[POST] [INDEXER] ERROR post_id={post_id}: {err}"),
    }

    println!("{post_url}");
    Ok(())
}
