//! Execution specification entities.
//!
//! An [`ExecutionSpec`] is the complete declaration a calling agent hands to
//! the engine: which provider and model, which data sources and tools, and
//! the processing policy that gates the answer. Specs are immutable once
//! constructed; the planner may derive a new optimized spec but never
//! mutates the original.

use super::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generation parameters forwarded to the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Provider and model selection plus generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Provider identifier (e.g. "openai", "anthropic")
    pub provider: String,
    /// Model identifier within the provider
    pub model: String,
    #[serde(default)]
    pub params: GenerationParams,
}

impl ProviderSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.params.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = Some(max_tokens);
        self
    }
}

/// Declaration of one data source to query during context gathering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceBinding {
    /// Source type key resolved against the data source registry
    pub source_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of snippets to retrieve
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Source-specific filter (e.g. tags, namespaces)
    #[serde(default)]
    pub filter: HashMap<String, serde_json::Value>,
    /// Override query; defaults to the request message when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_limit() -> usize {
    5
}

impl DataSourceBinding {
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            enabled: true,
            limit: default_limit(),
            filter: HashMap::new(),
            query: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Declaration of one tool to invoke before prompt composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub args: HashMap<String, serde_json::Value>,
}

impl ToolBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            args: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Processing policy: strategy plus the knobs of the validation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPolicy {
    #[serde(default)]
    pub strategy: Strategy,
    /// Combined confidence required to accept an answer
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Hard ceiling on validation attempts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-stage provider timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_confidence_threshold() -> f64 {
    0.75
}

fn default_max_attempts() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProcessingPolicy {
    fn default() -> Self {
        Self {
            strategy: Strategy::Direct,
            confidence_threshold: default_confidence_threshold(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProcessingPolicy {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Complete declarative specification for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSpec {
    pub provider: ProviderSpec,
    #[serde(default)]
    pub data_sources: Vec<DataSourceBinding>,
    #[serde(default)]
    pub tools: Vec<ToolBinding>,
    #[serde(default)]
    pub policy: ProcessingPolicy,
    /// Optional system instructions contributed by the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ExecutionSpec {
    pub fn new(provider: ProviderSpec) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_data_source(mut self, binding: DataSourceBinding) -> Self {
        self.data_sources.push(binding);
        self
    }

    pub fn with_tool(mut self, binding: ToolBinding) -> Self {
        self.tools.push(binding);
        self
    }

    pub fn with_policy(mut self, policy: ProcessingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Data sources that are declared and enabled.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &DataSourceBinding> {
        self.data_sources.iter().filter(|s| s.enabled)
    }

    /// Tools that are declared and enabled.
    pub fn enabled_tools(&self) -> impl Iterator<Item = &ToolBinding> {
        self.tools.iter().filter(|t| t.enabled)
    }

    pub fn has_enabled_sources(&self) -> bool {
        self.enabled_sources().next().is_some()
    }

    pub fn has_enabled_tools(&self) -> bool {
        self.enabled_tools().next().is_some()
    }
}
