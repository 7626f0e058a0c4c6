//! Guardrail port
//!
//! Safety and policy checks run before any planning or provider work. A
//! denial is terminal for the request: the engine returns a failure
//! response without invoking the provider.

use async_trait::async_trait;

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// Identity is not permitted to use the application
    Unauthorized,
    /// Identity exceeded its request rate limits
    RateLimited,
    /// Message content violates policy
    PolicyViolation(String),
}

impl DenialReason {
    pub fn message(&self) -> String {
        match self {
            DenialReason::Unauthorized => "Access denied".to_string(),
            DenialReason::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            DenialReason::PolicyViolation(detail) => format!("Request blocked: {detail}"),
        }
    }
}

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny(DenialReason),
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardrailDecision::Allow)
    }
}

/// Port for pre-flight safety checks.
#[async_trait]
pub trait GuardrailPort: Send + Sync {
    /// Normalize the inbound message before any check or planning sees it.
    ///
    /// The default implementation passes the message through unchanged.
    fn sanitize(&self, message: &str) -> String {
        message.to_string()
    }

    /// Check whether `identity` may run the sanitized `message` against
    /// `application`.
    async fn check(&self, identity: &str, application: &str, message: &str) -> GuardrailDecision;
}
