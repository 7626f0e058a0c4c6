//! Raw TOML configuration data types.
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use crate::guardrails::GuardrailSettings;
use crate::sources::SourceDocument;
use maestro_application::{ExecutionParams, ValidationParams};
use maestro_domain::{
    DataSourceBinding, ExecutionSpec, ProcessingPolicy, ProviderSpec, ToolBinding,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Provider backend selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub provider: String,
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }
}

/// Logging and trace output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// When set, workflow step events are appended here as JSONL
    pub trace_file: Option<PathBuf>,
    /// When set, tracing output is additionally written to this directory
    pub log_dir: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider backend settings
    pub provider: FileProviderConfig,
    /// Strategy and validation-loop knobs
    pub policy: ProcessingPolicy,
    /// Workflow executor settings
    pub execution: ExecutionParams,
    /// Confidence validator settings
    pub validation: ValidationParams,
    /// Guardrail settings
    pub guardrail: GuardrailSettings,
    /// Logging and trace settings
    pub logging: FileLoggingConfig,
    /// Data source bindings for the default spec
    pub data_sources: Vec<DataSourceBinding>,
    /// Tool bindings for the default spec
    pub tools: Vec<ToolBinding>,
    /// Documents seeding the in-memory `memory` source
    pub documents: Vec<SourceDocument>,
    /// System prompt for the default spec
    pub system_prompt: Option<String>,
}

impl FileConfig {
    /// Assemble the default execution spec from the configured sections.
    pub fn execution_spec(&self) -> ExecutionSpec {
        let mut provider = ProviderSpec::new(&self.provider.provider, &self.provider.model);
        provider.params.temperature = self.provider.temperature;
        provider.params.max_tokens = self.provider.max_tokens;
        provider.params.top_p = self.provider.top_p;

        let mut spec = ExecutionSpec::new(provider).with_policy(self.policy.clone());
        spec.data_sources = self.data_sources.clone();
        spec.tools = self.tools.clone();
        spec.system_prompt = self.system_prompt.clone();
        spec
    }

    /// Validate the configuration, returning human-readable problems.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.provider.provider.trim().is_empty() {
            issues.push("provider.provider must not be empty".to_string());
        }
        if self.provider.model.trim().is_empty() {
            issues.push("provider.model must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.policy.confidence_threshold) {
            issues.push(format!(
                "policy.confidence_threshold must be in [0, 1], got {}",
                self.policy.confidence_threshold
            ));
        }
        if self.policy.max_attempts == 0 {
            issues.push("policy.max_attempts must be at least 1".to_string());
        }
        let weight_sum = self.validation.weights.rule + self.validation.weights.rubric;
        if (weight_sum - 1.0).abs() > 1e-6 {
            issues.push(format!(
                "validation weights must sum to 1.0, got {weight_sum}"
            ));
        }

        issues
    }
}
