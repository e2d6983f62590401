//! MBC-20 inscription payloads and the post body that carries them.

use serde::Serialize;

use crate::AppError;

const PROTOCOL: &str = "mbc-20";
const MAX_TICK_LEN: usize = 8;
const WALLET_LEN: usize = 42;

/// Trailer appended to every inscription post.
pub const POST_TRAILER: &str = "mbc20.xyz";

/// A validated inscription operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inscription {
    Deploy { tick: String, max: String, lim: String },
    Mint { tick: String, amt: String },
    Transfer { tick: String, amt: String, to: String },
    Link { wallet: String },
}

/// Wire form; field order is the canonical key order.
#[derive(Serialize)]
struct WireInscription<'a> {
    p: &'static str,
    op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lim: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet: Option<&'a str>,
}

impl Inscription {
    pub fn mint(tick: &str, amt: &str) -> Result<Self, AppError> {
        Ok(Self::Mint {
            tick: validate_tick(tick)?,
            amt: validate_integer(amt, "amt")?,
        })
    }

    pub fn deploy(tick: &str, max: &str, lim: &str) -> Result<Self, AppError> {
        Ok(Self::Deploy {
            tick: validate_tick(tick)?,
            max: validate_integer(max, "max")?,
            lim: validate_integer(lim, "lim")?,
        })
    }

    pub fn transfer(tick: &str, amt: &str, to: &str) -> Result<Self, AppError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(AppError::InvalidInscription(
                "transfer recipient 'to' is required".into(),
            ));
        }
        Ok(Self::Transfer {
            tick: validate_tick(tick)?,
            amt: validate_integer(amt, "amt")?,
            to: to.to_string(),
        })
    }

    pub fn link(wallet: &str) -> Result<Self, AppError> {
        let wallet = wallet.trim();
        if !wallet.starts_with("0x") || wallet.len() != WALLET_LEN {
            return Err(AppError::InvalidInscription(format!(
                "wallet must start with 0x and be {WALLET_LEN} characters long"
            )));
        }
        Ok(Self::Link {
            wallet: wallet.to_string(),
        })
    }

    pub fn op(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Link { .. } => "link",
        }
    }

    /// Canonical compact JSON (no whitespace, fixed key order).
    pub fn to_compact_json(&self) -> String {
        let mut wire = WireInscription {
            p: PROTOCOL,
            op: self.op(),
            tick: None,
            amt: None,
            max: None,
            lim: None,
            to: None,
            wallet: None,
        };
        match self {
            Self::Deploy { tick, max, lim } => {
                wire.tick = Some(tick.as_str());
                wire.max = Some(max.as_str());
                wire.lim = Some(lim.as_str());
            }
            Self::Mint { tick, amt } => {
                wire.tick = Some(tick.as_str());
                wire.amt = Some(amt.as_str());
            }
            Self::Transfer { tick, amt, to } => {
                wire.tick = Some(tick.as_str());
                wire.amt = Some(amt.as_str());
                wire.to = Some(to.as_str());
            }
            Self::Link { wallet } => wire.wallet = Some(wallet.as_str()),
        }
        serde_json::to_string(&wire).expect("inscription of plain strings serializes")
    }
}

/// Join the optional description, the inscription JSON and the trailer with
/// blank lines.
pub fn build_post_body(description: &str, inscription_json: &str) -> String {
    let description = description.trim();
    let mut parts = Vec::with_capacity(3);
    if !description.is_empty() {
        parts.push(description);
    }
    parts.push(inscription_json);
    parts.push(POST_TRAILER);
    parts.join("\n\n")
}

fn validate_tick(tick: &str) -> Result<String, AppError> {
    let tick = tick.trim();
    let len = tick.chars().count();
    if len == 0 || len > MAX_TICK_LEN {
        return Err(AppError::InvalidInscription(format!(
            "tick must be 1-{MAX_TICK_LEN} characters"
        )));
    }
    Ok(tick.to_string())
}

fn validate_integer(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInscription(format!("{field} is required")));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidInscription(format!(
            "{field} must be an integer"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_json_is_compact_and_ordered() {
        let inscription = Inscription::mint("CLAW", "100").unwrap();
        assert_eq!(
            inscription.to_compact_json(),
            r#"{"p":"mbc-20","op":"mint","tick":"CLAW","amt":"100"}"#
        );
    }

    #[test]
    fn test_deploy_json() {
        let inscription = Inscription::deploy("CLAW", "21000000", "1000").unwrap();
        assert_eq!(
            inscription.to_compact_json(),
            r#"{"p":"mbc-20","op":"deploy","tick":"CLAW","max":"21000000","lim":"1000"}"#
        );
    }

    #[test]
    fn test_transfer_json() {
        let inscription = Inscription::transfer("CLAW", "5", "reef_agent").unwrap();
        assert_eq!(
            inscription.to_compact_json(),
            r#"{"p":"mbc-20","op":"transfer","tick":"CLAW","amt":"5","to":"reef_agent"}"#
        );
    }

    #[test]
    fn test_link_requires_hex_address() {
        assert!(Inscription::link("0x1234").is_err());
        let wallet = format!("0x{}", "a".repeat(40));
        let inscription = Inscription::link(&wallet).unwrap();
        assert_eq!(
            inscription.to_compact_json(),
            format!(r#"{{"p":"mbc-20","op":"link","wallet":"{wallet}"}}"#)
        );
    }

    #[test]
    fn test_non_ascii_tick_kept_verbatim() {
        let inscription = Inscription::mint("蟹", "1").unwrap();
        assert!(inscription.to_compact_json().contains("\"tick\":\"蟹\""));
    }

    #[test]
    fn test_tick_length_limits() {
        assert!(Inscription::mint("", "1").is_err());
        assert!(Inscription::mint("ABCDEFGHI", "1").is_err());
        assert!(Inscription::mint("ABCDEFGH", "1").is_ok());
    }

    #[test]
    fn test_amount_must_be_integer() {
        let err = Inscription::mint("CLAW", "1.5").unwrap_err();
        assert_eq!(err.to_string(), "Invalid inscription: amt must be an integer");
        assert!(Inscription::mint("CLAW", " ").is_err());
    }

    #[test]
    fn test_post_body_with_description() {
        let body = build_post_body("  minting claws  ", "{}");
        assert_eq!(body, "minting claws\n\n{}\n\nmbc20.xyz");
    }

    #[test]
    fn test_post_body_without_description() {
        assert_eq!(build_post_body("", "{}"), "{}\n\nmbc20.xyz");
    }
}
