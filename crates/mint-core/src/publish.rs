//! Values exchanged with the posting service: publish responses, verification
//! challenges and verification outcomes.

use serde_json::Value;

/// Raw result of a publish call.
///
/// `status == 0` means no HTTP response arrived (timeout or transport
/// failure). HTTP-level errors are carried in `status`, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResponse {
    pub body: Option<Value>,
    pub status: u16,
    /// Server-suggested wait from a 429 body, in minutes.
    pub retry_after_minutes: Option<f64>,
}

/// A verification challenge attached to a freshly created post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub code: String,
    pub text: String,
    pub expires_at: Option<String>,
}

/// Result of submitting an answer to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub accepted: bool,
    pub diagnostic: String,
}

impl PublishResponse {
    pub fn network_failure() -> Self {
        Self {
            body: None,
            status: 0,
            retry_after_minutes: None,
        }
    }

    pub fn is_network_failure(&self) -> bool {
        self.status == 0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.has_body()
    }

    fn has_body(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }

    /// Post identifier: `post.id`, falling back to a top-level `id`.
    pub fn post_id(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        body.get("post")
            .and_then(|post| post.get("id"))
            .and_then(id_to_string)
            .or_else(|| body.get("id").and_then(id_to_string))
    }

    /// Verification challenge, if the response carries a complete one.
    ///
    /// Reads `post.verification.{verification_code, challenge_text}` first and
    /// falls back to the older `verification.{code, challenge}` shape, which
    /// only counts when the response flags verification as required.
    pub fn challenge(&self) -> Option<Challenge> {
        let body = self.body.as_ref()?;

        if let Some(verification) = body.get("post").and_then(|p| p.get("verification"))
            && let (Some(code), Some(text)) = (
                non_empty_str(verification, "verification_code"),
                non_empty_str(verification, "challenge_text"),
            )
        {
            return Some(Challenge {
                code,
                text,
                expires_at: non_empty_str(verification, "expires_at"),
            });
        }

        let verification = body.get("verification")?;
        let required = body
            .get("verification_required")
            .and_then(Value::as_bool)
            .or_else(|| verification.get("required").and_then(Value::as_bool))
            .unwrap_or(false);
        if !required {
            return None;
        }
        Some(Challenge {
            code: non_empty_str(verification, "code")?,
            text: non_empty_str(verification, "challenge")?,
            expires_at: non_empty_str(verification, "expires_at"),
        })
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> PublishResponse {
        PublishResponse {
            body: Some(body),
            status: 201,
            retry_after_minutes: None,
        }
    }

    #[test]
    fn test_network_failure_is_status_zero() {
        let resp = PublishResponse::network_failure();
        assert!(resp.is_network_failure());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_empty_object_body_is_not_success() {
        let resp = response(json!({}));
        assert!(!resp.is_success());
    }

    #[test]
    fn test_post_id_nested() {
        let resp = response(json!({"post": {"id": "abc-123"}}));
        assert_eq!(resp.post_id().as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_post_id_top_level_fallback() {
        let resp = response(json!({"id": 77}));
        assert_eq!(resp.post_id().as_deref(), Some("77"));
    }

    #[test]
    fn test_post_id_missing() {
        let resp = response(json!({"post": {"title": "x"}}));
        assert!(resp.post_id().is_none());
        let resp = response(json!({"post": {"id": ""}}));
        assert!(resp.post_id().is_none());
    }

    #[test]
    fn test_challenge_new_shape() {
        let resp = response(json!({
            "post": {
                "id": "p1",
                "verification": {
                    "verification_code": "vc-1",
                    "challenge_text": "A lobster has ten claws",
                    "expires_at": "2026-10-18T10:00:00Z"
                }
            }
        }));
        let challenge = resp.challenge().unwrap();
        assert_eq!(challenge.code, "vc-1");
        assert_eq!(challenge.text, "A lobster has ten claws");
        assert_eq!(challenge.expires_at.as_deref(), Some("2026-10-18T10:00:00Z"));
    }

    #[test]
    fn test_challenge_incomplete_is_none() {
        let resp = response(json!({
            "post": {"id": "p1", "verification": {"verification_code": "vc-1"}}
        }));
        assert!(resp.challenge().is_none());
    }

    #[test]
    fn test_challenge_legacy_shape_requires_flag() {
        let body = json!({
            "post": {"id": "p1"},
            "verification": {"code": "c", "challenge": "two plus two"}
        });
        assert!(response(body.clone()).challenge().is_none());

        let mut flagged = body;
        flagged["verification_required"] = json!(true);
        let challenge = response(flagged).challenge().unwrap();
        assert_eq!(challenge.code, "c");
        assert_eq!(challenge.text, "two plus two");
    }
}
