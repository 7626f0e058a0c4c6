//! Inbound engine request

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request from a calling agent.
///
/// Carries the user's message together with the application tag, session
/// correlation id, and an opaque user-context map (identity, roles, profile
/// fields). The accompanying [`ExecutionSpec`](crate::ExecutionSpec) is
/// passed separately and is read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    /// The user's message
    pub message: String,
    /// Application tag (which surface the request came from)
    pub application: String,
    /// Session correlation id
    pub session_id: String,
    /// Opaque user context (identity, roles, preferences)
    #[serde(default)]
    pub user_context: HashMap<String, serde_json::Value>,
}

impl EngineRequest {
    pub fn new(message: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            application: application.into(),
            session_id: String::new(),
            user_context: HashMap::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_context_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.user_context.insert(key.into(), value.into());
        self
    }

    /// Caller identity used for guardrail checks.
    ///
    /// Falls back to `"anonymous"` when the context carries no user id.
    pub fn identity(&self) -> &str {
        self.user_context
            .get("user_id")
            .and_then(|v| v.as_str())
            .unwrap_or("anonymous")
    }
}
