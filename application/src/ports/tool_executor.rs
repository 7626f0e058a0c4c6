//! Tool executor port
//!
//! Defines the interface for invoking a named side-effecting or lookup
//! action with arguments. Failures are recorded as context notes by the
//! workflow rather than aborting the request.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from a tool invocation.
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

/// Port for tool execution.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool;

    /// Names of all available tools
    fn available_tools(&self) -> Vec<String>;

    /// Invoke a tool, returning a structured result
    async fn invoke(
        &self,
        name: &str,
        args: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ToolError>;
}
