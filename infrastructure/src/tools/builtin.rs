//! Builtin tool executor.
//!
//! Ships three side-effect-free tools: `clock` (current UTC time), `echo`
//! (returns its `text` argument) and `word_count` (counts words in its
//! `text` argument). External tool backends implement the same port.

use async_trait::async_trait;
use chrono::Utc;
use maestro_application::{ToolError, ToolExecutorPort};
use std::collections::HashMap;
use tracing::debug;

const TOOL_NAMES: &[&str] = &["clock", "echo", "word_count"];

/// Executor for the builtin tool set.
#[derive(Debug, Default)]
pub struct BuiltinToolExecutor;

impl BuiltinToolExecutor {
    pub fn new() -> Self {
        Self
    }
}

fn text_arg(args: &HashMap<String, serde_json::Value>) -> Result<&str, ToolError> {
    args.get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments("missing string argument 'text'".to_string()))
}

#[async_trait]
impl ToolExecutorPort for BuiltinToolExecutor {
    fn has_tool(&self, name: &str) -> bool {
        TOOL_NAMES.contains(&name)
    }

    fn available_tools(&self) -> Vec<String> {
        TOOL_NAMES.iter().map(|s| s.to_string()).collect()
    }

    async fn invoke(
        &self,
        name: &str,
        args: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ToolError> {
        debug!(tool = name, "invoking builtin tool");
        match name {
            "clock" => Ok(serde_json::json!({
                "utc": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            })),
            "echo" => {
                let text = text_arg(args)?;
                Ok(serde_json::json!({ "text": text }))
            }
            "word_count" => {
                let text = text_arg(args)?;
                Ok(serde_json::json!({
                    "words": text.split_whitespace().count(),
                }))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clock_reports_utc() {
        let executor = BuiltinToolExecutor::new();
        let output = executor.invoke("clock", &HashMap::new()).await.unwrap();
        assert!(output["utc"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn echo_and_word_count_use_the_text_arg() {
        let executor = BuiltinToolExecutor::new();
        let args = HashMap::from([("text".to_string(), serde_json::json!("one two three"))]);

        let output = executor.invoke("echo", &args).await.unwrap();
        assert_eq!(output["text"], "one two three");

        let output = executor.invoke("word_count", &args).await.unwrap();
        assert_eq!(output["words"], 3);
    }

    #[tokio::test]
    async fn missing_text_arg_is_invalid() {
        let executor = BuiltinToolExecutor::new();
        let err = executor.invoke("echo", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let executor = BuiltinToolExecutor::new();
        assert!(!executor.has_tool("launch_missiles"));
        let err = executor
            .invoke("launch_missiles", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }
}
