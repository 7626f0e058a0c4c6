//! Reasoning optimization of an execution spec.
//!
//! The optimizer asks a model to review the declared spec against the
//! incoming message and suggest adjustments in a fixed directive format.
//! Directives are applied to a copy of the spec; the original is never
//! mutated. A failed optimizer call degrades to the original spec with
//! confidence 0.0 so the planner can decide what to do with it.

use crate::ports::provider_gateway::ProviderGateway;
use maestro_domain::{ExecutionSpec, Message};
use std::sync::Arc;
use tracing::{debug, warn};

/// Confidence assumed when the optimizer response omits a CONFIDENCE line.
const DEFAULT_REASONING_CONFIDENCE: f64 = 0.75;

/// Result of one optimization pass.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub spec: ExecutionSpec,
    /// Self-reported confidence in [0, 1]; 0.0 when the optimizer call failed
    pub confidence: f64,
    pub notes: Vec<String>,
    /// Whether the optimized spec structurally differs from the original
    pub changed: bool,
}

/// Runs the reasoning pass over a spec.
pub struct ReasoningOptimizer {
    gateway: Arc<dyn ProviderGateway>,
}

impl ReasoningOptimizer {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self { gateway }
    }

    /// Ask the model to review `spec` for `message` and apply its directives.
    pub async fn optimize(&self, spec: &ExecutionSpec, message: &str) -> OptimizationOutcome {
        let prompt = build_review_prompt(spec, message);
        let messages = vec![
            Message::system(
                "You are an execution planner. Review the declared configuration \
                 against the user's request and respond ONLY with directive lines.",
            ),
            Message::user(prompt),
        ];

        // Low temperature keeps directive output stable
        let provider = spec.provider.clone().with_temperature(0.2);

        match self.gateway.invoke(&provider, &messages).await {
            Ok(response) => {
                let outcome = apply_directives(spec, &response);
                debug!(
                    confidence = outcome.confidence,
                    changed = outcome.changed,
                    notes = outcome.notes.len(),
                    "reasoning pass complete"
                );
                outcome
            }
            Err(err) => {
                warn!(error = %err, "reasoning pass failed, keeping original spec");
                OptimizationOutcome {
                    spec: spec.clone(),
                    confidence: 0.0,
                    notes: vec![format!("reasoning unavailable: {err}")],
                    changed: false,
                }
            }
        }
    }
}

fn build_review_prompt(spec: &ExecutionSpec, message: &str) -> String {
    let sources: Vec<&str> = spec
        .enabled_sources()
        .map(|s| s.source_type.as_str())
        .collect();
    let tools: Vec<&str> = spec.enabled_tools().map(|t| t.name.as_str()).collect();

    format!(
        "User request: {message}\n\n\
         Declared configuration:\n\
         - provider: {provider} / {model}\n\
         - temperature: {temperature}\n\
         - max_tokens: {max_tokens}\n\
         - data sources: {sources}\n\
         - tools: {tools}\n\n\
         Suggest adjustments using only these directives, one per line:\n\
         TEMPERATURE: <0.0-2.0>\n\
         MAX_TOKENS: <number>\n\
         DISABLE_SOURCE: <source type>\n\
         DISABLE_TOOL: <tool name>\n\
         NOTE: <rationale>\n\
         CONFIDENCE: <0.0-1.0>\n\
         Omit any directive you have no change for. Always end with CONFIDENCE.",
        message = message,
        provider = spec.provider.provider,
        model = spec.provider.model,
        temperature = spec
            .provider
            .params
            .temperature
            .map_or("default".to_string(), |t| t.to_string()),
        max_tokens = spec
            .provider
            .params
            .max_tokens
            .map_or("default".to_string(), |t| t.to_string()),
        sources = if sources.is_empty() {
            "none".to_string()
        } else {
            sources.join(", ")
        },
        tools = if tools.is_empty() {
            "none".to_string()
        } else {
            tools.join(", ")
        },
    )
}

/// Apply directive lines from an optimizer response to a copy of `spec`.
///
/// Unknown lines are ignored. Out-of-range confidence values are clamped.
pub fn apply_directives(spec: &ExecutionSpec, response: &str) -> OptimizationOutcome {
    let mut optimized = spec.clone();
    let mut confidence = DEFAULT_REASONING_CONFIDENCE;
    let mut notes = Vec::new();

    for line in response.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        if let Some(value) = labeled_value(line, "TEMPERATURE:") {
            if let Ok(t) = value.parse::<f64>() {
                optimized.provider.params.temperature = Some(t.clamp(0.0, 2.0));
            }
        } else if let Some(value) = labeled_value(line, "MAX_TOKENS:") {
            if let Ok(t) = value.parse::<u32>() {
                optimized.provider.params.max_tokens = Some(t);
            }
        } else if let Some(name) = labeled_value(line, "DISABLE_SOURCE:") {
            for source in &mut optimized.data_sources {
                if source.source_type.eq_ignore_ascii_case(name) {
                    source.enabled = false;
                }
            }
        } else if let Some(name) = labeled_value(line, "DISABLE_TOOL:") {
            for tool in &mut optimized.tools {
                if tool.name.eq_ignore_ascii_case(name) {
                    tool.enabled = false;
                }
            }
        } else if let Some(note) = labeled_value(line, "NOTE:") {
            if !note.is_empty() {
                notes.push(note.to_string());
            }
        } else if let Some(value) = labeled_value(line, "CONFIDENCE:") {
            if let Ok(c) = value.parse::<f64>() {
                confidence = c.clamp(0.0, 1.0);
            }
        }
    }

    let changed = serde_json::to_value(spec).unwrap_or_default()
        != serde_json::to_value(&optimized).unwrap_or_default();

    OptimizationOutcome {
        spec: optimized,
        confidence,
        notes,
        changed,
    }
}

fn labeled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    // get() rejects splits inside a multibyte character
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| line[label.len()..].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_domain::{DataSourceBinding, ProviderSpec, ToolBinding};

    fn spec() -> ExecutionSpec {
        ExecutionSpec::new(ProviderSpec::new("openai", "gpt-4o-mini"))
            .with_data_source(DataSourceBinding::new("vector_db"))
            .with_tool(ToolBinding::new("clock"))
    }

    #[test]
    fn directives_adjust_the_copy() {
        let original = spec();
        let response = "TEMPERATURE: 0.4\nMAX_TOKENS: 1500\nDISABLE_TOOL: clock\n\
                        NOTE: clock not relevant to this request\nCONFIDENCE: 0.85";
        let outcome = apply_directives(&original, response);

        assert_eq!(outcome.spec.provider.params.temperature, Some(0.4));
        assert_eq!(outcome.spec.provider.params.max_tokens, Some(1500));
        assert!(!outcome.spec.tools[0].enabled);
        assert_eq!(outcome.confidence, 0.85);
        assert_eq!(outcome.notes.len(), 1);
        assert!(outcome.changed);
        // Original untouched
        assert!(original.tools[0].enabled);
    }

    #[test]
    fn missing_confidence_defaults() {
        let outcome = apply_directives(&spec(), "TEMPERATURE: 0.9");
        assert_eq!(outcome.confidence, DEFAULT_REASONING_CONFIDENCE);
        assert!(outcome.changed);
    }

    #[test]
    fn no_directives_leaves_spec_unchanged() {
        let outcome = apply_directives(&spec(), "Everything looks fine as declared.");
        assert!(!outcome.changed);
        assert!(outcome.notes.is_empty());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let outcome = apply_directives(&spec(), "TEMPERATURE: 9.5\nCONFIDENCE: 1.8");
        assert_eq!(outcome.spec.provider.params.temperature, Some(2.0));
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn multibyte_commentary_lines_are_ignored() {
        // "déjà" puts a two-byte character across a label-length boundary
        let outcome = apply_directives(&spec(), "réglage déjà correct\nCONFIDENCE: 0.9");
        assert_eq!(outcome.confidence, 0.9);
        assert!(!outcome.changed);
    }

    #[test]
    fn disable_source_matches_case_insensitively() {
        let outcome = apply_directives(&spec(), "DISABLE_SOURCE: Vector_DB\nCONFIDENCE: 0.9");
        assert!(!outcome.spec.data_sources[0].enabled);
    }
}
