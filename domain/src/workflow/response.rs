//! Outbound engine response.

use serde::{Deserialize, Serialize};

/// Final status reported to the caller.
///
/// Low confidence is not a failure: exhausting the retry budget still yields
/// `Completed` with fallback content. Only guardrail and planning errors
/// produce `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Completed,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseStatus::Completed => "completed",
            ResponseStatus::Failed => "failed",
        }
    }
}

/// Observability metadata attached to every response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Ordered step trace from the workflow
    pub execution_steps: Vec<String>,
    pub confidence_score: f64,
    pub validation_attempts: u32,
    pub errors: Vec<String>,
    pub duration_seconds: f64,
}

/// The response returned to the calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub success: bool,
    pub content: String,
    /// Final combined confidence, in [0, 1]
    pub confidence: f64,
    pub status: ResponseStatus,
    pub metadata: ResponseMetadata,
}

impl EngineResponse {
    /// A hard failure (guardrail denial or planning error).
    pub fn failure(message: impl Into<String>, duration_seconds: f64) -> Self {
        let message = message.into();
        Self {
            success: false,
            content: message.clone(),
            confidence: 0.0,
            status: ResponseStatus::Failed,
            metadata: ResponseMetadata {
                errors: vec![message],
                duration_seconds,
                ..ResponseMetadata::default()
            },
        }
    }
}
