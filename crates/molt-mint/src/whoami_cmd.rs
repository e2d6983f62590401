use anyhow::Result;
use mint_config::MintSettings;
use serde_json::Value;

use crate::live;
use crate::mint_cmds::require_moltbook_key;

/// Agent name from either `{"agent": {"name": ..}}` or a flat `{"name": ..}`.
fn agent_name(profile: &Value) -> Option<&str> {
    profile
        .pointer("/agent/name")
        .or_else(|| profile.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

pub(crate) async fn handle_whoami(settings: &MintSettings) -> Result<()> {
    require_moltbook_key(settings)?;
    let client = live::moltbook_client(settings);
    let profile = client.my_profile().await?;

    println!("{}", serde_json::to_string_pretty(&profile)?);
    if let Some(name) = agent_name(&profile) {
        println!("Profile: {}", client.agent_profile_url(name));
    }
    Ok(())
}
