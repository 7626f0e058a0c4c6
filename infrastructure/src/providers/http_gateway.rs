//! HTTP provider gateway for OpenAI-compatible chat completion APIs.
//!
//! One gateway instance serves every provider spec whose backend speaks the
//! `/chat/completions` wire format. HTTP status codes are mapped onto the
//! transient/permanent error split the workflow retries on.

use async_trait::async_trait;
use maestro_application::{ProviderError, ProviderGateway};
use maestro_domain::{Message, ProviderSpec, truncate_str};
use serde::Deserialize;
use tracing::debug;

/// Gateway speaking the OpenAI-compatible chat completion protocol.
pub struct HttpProviderGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProviderGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Read the API key from the named environment variable.
    pub fn from_env(base_url: impl Into<String>, api_key_env: &str) -> Self {
        Self::new(base_url, std::env::var(api_key_env).ok())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Build the JSON request body for one invocation.
fn request_body(provider: &ProviderSpec, messages: &[Message]) -> serde_json::Value {
    let wire_messages: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": provider.model,
        "messages": wire_messages,
    });
    let params = &provider.params;
    if let Some(temperature) = params.temperature {
        body["temperature"] = temperature.into();
    }
    if let Some(max_tokens) = params.max_tokens {
        body["max_tokens"] = max_tokens.into();
    }
    if let Some(top_p) = params.top_p {
        body["top_p"] = top_p.into();
    }
    body
}

/// Map an HTTP error status onto the provider error taxonomy.
fn classify_status(status: u16, body: &str) -> ProviderError {
    let detail = truncate_str(body, 200).to_string();
    match status {
        401 | 403 => ProviderError::Unauthorized(detail),
        408 => ProviderError::Timeout,
        429 => ProviderError::RateLimited,
        400..=499 => ProviderError::InvalidRequest(detail),
        500..=599 => ProviderError::Unavailable(format!("status {status}: {detail}")),
        _ => ProviderError::Other(format!("status {status}: {detail}")),
    }
}

fn classify_transport(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_connect() {
        ProviderError::Unavailable(err.to_string())
    } else {
        ProviderError::Other(err.to_string())
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn invoke(
        &self,
        provider: &ProviderSpec,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        debug!(
            provider = %provider.provider,
            model = %provider.model,
            messages = messages.len(),
            "invoking chat completion"
        );

        let mut request = self
            .client
            .post(self.endpoint())
            .json(&request_body(provider, messages));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}
