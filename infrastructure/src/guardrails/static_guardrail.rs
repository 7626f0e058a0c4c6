//! Static guardrail with allowlist, rate-limit and content checks.
//!
//! The inbound message is sanitized first (markup stripped, length capped),
//! then checks run in a fixed order: authorization, rate limits, blocked
//! terms. The first failed check produces the denial. Rate limiting uses
//! per-identity sliding windows over the last minute and hour.

use async_trait::async_trait;
use maestro_application::{DenialReason, GuardrailDecision, GuardrailPort};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Settings for [`StaticGuardrail`], usually loaded from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    /// Identities allowed through; empty allows everyone
    pub allowed_users: Vec<String>,
    /// Case-insensitive substrings that block a message
    pub blocked_terms: Vec<String>,
    /// Requests per identity per minute
    pub per_minute_limit: usize,
    /// Requests per identity per hour
    pub per_hour_limit: usize,
    /// Maximum sanitized message length in characters
    pub max_message_chars: usize,
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            allowed_users: Vec::new(),
            blocked_terms: Vec::new(),
            per_minute_limit: 60,
            per_hour_limit: 1000,
            max_message_chars: 10_000,
        }
    }
}

/// In-process guardrail adapter.
pub struct StaticGuardrail {
    settings: GuardrailSettings,
    history: Mutex<HashMap<String, Vec<Instant>>>,
}

impl StaticGuardrail {
    pub fn new(settings: GuardrailSettings) -> Self {
        Self {
            settings,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Record the request and check both rate windows.
    fn check_rate(&self, identity: &str) -> bool {
        let now = Instant::now();
        let hour = Duration::from_secs(3600);
        let minute = Duration::from_secs(60);

        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            // A poisoned lock means another check panicked; fail open
            Err(poisoned) => poisoned.into_inner(),
        };
        let timestamps = history.entry(identity.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < hour);

        let last_minute = timestamps
            .iter()
            .filter(|t| now.duration_since(**t) < minute)
            .count();
        if last_minute >= self.settings.per_minute_limit
            || timestamps.len() >= self.settings.per_hour_limit
        {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Remove `<...>` markup spans. An unterminated tag is dropped to its end.
fn strip_markup(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut in_tag = false;
    for c in message.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[async_trait]
impl GuardrailPort for StaticGuardrail {
    fn sanitize(&self, message: &str) -> String {
        let stripped = strip_markup(message);
        let mut sanitized: String = stripped
            .chars()
            .take(self.settings.max_message_chars)
            .collect();
        if sanitized.len() < stripped.len() {
            warn!(
                max = self.settings.max_message_chars,
                "message truncated during sanitization"
            );
        }
        sanitized = sanitized.trim().to_string();
        sanitized
    }

    async fn check(&self, identity: &str, application: &str, message: &str) -> GuardrailDecision {
        if !self.settings.allowed_users.is_empty()
            && !self.settings.allowed_users.iter().any(|u| u == identity)
        {
            warn!(identity, application, "identity not in allowlist");
            return GuardrailDecision::Deny(DenialReason::Unauthorized);
        }

        if !self.check_rate(identity) {
            warn!(identity, application, "rate limit exceeded");
            return GuardrailDecision::Deny(DenialReason::RateLimited);
        }

        let lower = message.to_lowercase();
        for term in &self.settings.blocked_terms {
            if !term.is_empty() && lower.contains(&term.to_lowercase()) {
                warn!(identity, application, "message contains blocked term");
                return GuardrailDecision::Deny(DenialReason::PolicyViolation(
                    "message contains blocked content".to_string(),
                ));
            }
        }

        GuardrailDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GuardrailSettings {
        GuardrailSettings::default()
    }

    #[tokio::test]
    async fn empty_allowlist_admits_anyone() {
        let guardrail = StaticGuardrail::new(settings());
        let decision = guardrail.check("anonymous", "chat", "hello there").await;
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn allowlist_rejects_unknown_identity() {
        let guardrail = StaticGuardrail::new(GuardrailSettings {
            allowed_users: vec!["alice".into()],
            ..settings()
        });

        assert!(guardrail.check("alice", "chat", "hello").await.is_allowed());
        assert_eq!(
            guardrail.check("bob", "chat", "hello").await,
            GuardrailDecision::Deny(DenialReason::Unauthorized)
        );
    }

    #[tokio::test]
    async fn blocked_terms_match_case_insensitively() {
        let guardrail = StaticGuardrail::new(GuardrailSettings {
            blocked_terms: vec!["forbidden".into()],
            ..settings()
        });

        let decision = guardrail
            .check("alice", "chat", "This is FORBIDDEN text")
            .await;
        assert!(matches!(
            decision,
            GuardrailDecision::Deny(DenialReason::PolicyViolation(_))
        ));
    }

    #[tokio::test]
    async fn minute_window_rate_limits() {
        let guardrail = StaticGuardrail::new(GuardrailSettings {
            per_minute_limit: 2,
            ..settings()
        });

        assert!(guardrail.check("alice", "chat", "one").await.is_allowed());
        assert!(guardrail.check("alice", "chat", "two").await.is_allowed());
        assert_eq!(
            guardrail.check("alice", "chat", "three").await,
            GuardrailDecision::Deny(DenialReason::RateLimited)
        );
        // Other identities are unaffected
        assert!(guardrail.check("bob", "chat", "one").await.is_allowed());
    }

    #[test]
    fn sanitize_strips_markup_and_caps_length() {
        let guardrail = StaticGuardrail::new(GuardrailSettings {
            max_message_chars: 20,
            ..settings()
        });

        assert_eq!(guardrail.sanitize("hello <b>world</b>"), "hello world");
        assert_eq!(
            guardrail.sanitize("a very long message that exceeds the cap"),
            "a very long message"
        );
    }

    #[test]
    fn sanitize_leaves_plain_text_alone() {
        let guardrail = StaticGuardrail::new(settings());
        assert_eq!(guardrail.sanitize("what is rust?"), "what is rust?");
    }
}
