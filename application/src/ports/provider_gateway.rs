//! Provider gateway port
//!
//! Defines the interface for invoking a generative backend with a message
//! list and parameters. Errors are classified as transient (retryable
//! within the provider stage) or permanent (fail the attempt immediately).

use async_trait::async_trait;
use maestro_domain::{Message, ProviderSpec};
use thiserror::Error;

/// Errors that can occur when invoking a provider.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider timed out")]
    Timeout,

    #[error("Provider rate limited the request")]
    RateLimited,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether the provider stage may retry this error within its small
    /// fixed retry budget.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout | ProviderError::RateLimited | ProviderError::Unavailable(_)
        )
    }
}

/// Gateway for generative backends.
///
/// Implementations (adapters) live in the infrastructure layer. The spec's
/// provider/model identifiers select the backend; generation parameters are
/// forwarded as-is.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Invoke the backend with a composed message sequence, returning the
    /// generated text.
    async fn invoke(
        &self,
        provider: &ProviderSpec,
        messages: &[Message],
    ) -> Result<String, ProviderError>;
}
