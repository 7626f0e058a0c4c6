//! Per-request workflow state.
//!
//! One [`WorkflowState`] exists per request execution and never outlives it.
//! The state is modeled as an immutable value per step: each stage consumes
//! the previous state and produces a new one, which keeps the step trace
//! trivially reconstructible and makes concurrency reasoning simple (no
//! shared mutation between requests).

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// A retrieved context snippet from a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub text: String,
    pub score: f64,
    pub source_id: String,
}

impl ContextSnippet {
    pub fn new(text: impl Into<String>, score: f64, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score,
            source_id: source_id.into(),
        }
    }
}

/// Outcome of one tool invocation.
///
/// A failed invocation is recorded as a note ("tool X unavailable") rather
/// than aborting the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ToolOutcome {
    pub fn success(tool: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            output: Some(output),
            note: None,
        }
    }

    pub fn unavailable(tool: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            output: None,
            note: Some(note.into()),
        }
    }
}

/// Stages of the workflow, in fixed order.
///
/// The only loop edge runs from `ValidateResponse` back to `ComposePrompt`
/// while confidence is below threshold and budget remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    Initialize,
    GatherContext,
    InvokeTools,
    ComposePrompt,
    InvokeProvider,
    ValidateResponse,
    Finalize,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStep::Initialize => "initialize",
            WorkflowStep::GatherContext => "gather_context",
            WorkflowStep::InvokeTools => "invoke_tools",
            WorkflowStep::ComposePrompt => "compose_prompt",
            WorkflowStep::InvokeProvider => "invoke_provider",
            WorkflowStep::ValidateResponse => "validate_response",
            WorkflowStep::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::Running => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::CompletedWithErrors => "completed_with_errors",
            WorkflowStatus::Failed => "failed",
        }
    }
}

/// Accumulated state for one request execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub execution_id: String,
    pub snippets: Vec<ContextSnippet>,
    pub tool_outcomes: Vec<ToolOutcome>,
    pub messages: Vec<Message>,
    /// Latest candidate response text
    pub candidate: Option<String>,
    /// Latest combined confidence score, in [0, 1]
    pub confidence: f64,
    pub attempt_count: u32,
    pub max_attempts: u32,
    /// Validation feedback steering the next retry
    pub feedback: Option<String>,
    /// Whether the latest candidate cleared the threshold
    pub accepted: bool,
    /// Ordered step trace for observability
    pub steps: Vec<String>,
    pub errors: Vec<String>,
    pub status: WorkflowStatus,
}

impl WorkflowState {
    pub fn new(execution_id: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            execution_id: execution_id.into(),
            snippets: Vec::new(),
            tool_outcomes: Vec::new(),
            messages: Vec::new(),
            candidate: None,
            confidence: 0.0,
            attempt_count: 0,
            max_attempts,
            feedback: None,
            accepted: false,
            steps: Vec::new(),
            errors: Vec::new(),
            status: WorkflowStatus::Running,
        }
    }

    /// Append a step to the trace.
    pub fn record_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step.as_str().to_string());
        self
    }

    pub fn with_snippets(mut self, snippets: Vec<ContextSnippet>) -> Self {
        self.snippets = snippets;
        self
    }

    pub fn with_tool_outcomes(mut self, outcomes: Vec<ToolOutcome>) -> Self {
        self.tool_outcomes = outcomes;
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_candidate(mut self, candidate: impl Into<String>) -> Self {
        self.candidate = Some(candidate.into());
        self
    }

    /// Record a validation outcome, clamping confidence into [0, 1].
    pub fn with_validation(
        mut self,
        confidence: f64,
        accepted: bool,
        feedback: Option<String>,
    ) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self.accepted = accepted;
        self.feedback = feedback;
        self
    }

    /// Consume one validation attempt. Saturates at `max_attempts`.
    pub fn next_attempt(mut self) -> Self {
        if self.attempt_count < self.max_attempts {
            self.attempt_count += 1;
        }
        self
    }

    /// Whether the retry budget still allows another attempt.
    pub fn budget_remaining(&self) -> bool {
        self.attempt_count < self.max_attempts
    }

    pub fn push_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn finalized(mut self, status: WorkflowStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_counter_is_monotonic_and_bounded() {
        let mut state = WorkflowState::new("x", 3);
        for expected in 1..=3 {
            state = state.next_attempt();
            assert_eq!(state.attempt_count, expected);
        }
        // Saturates at the ceiling
        state = state.next_attempt();
        assert_eq!(state.attempt_count, 3);
        assert!(!state.budget_remaining());
    }

    #[test]
    fn confidence_is_clamped() {
        let state = WorkflowState::new("x", 5).with_validation(1.4, true, None);
        assert_eq!(state.confidence, 1.0);
        let state = WorkflowState::new("x", 5).with_validation(-0.2, false, None);
        assert_eq!(state.confidence, 0.0);
    }

    #[test]
    fn step_trace_preserves_order() {
        let state = WorkflowState::new("x", 5)
            .record_step(WorkflowStep::Initialize)
            .record_step(WorkflowStep::ComposePrompt)
            .record_step(WorkflowStep::InvokeProvider);
        assert_eq!(
            state.steps,
            vec!["initialize", "compose_prompt", "invoke_provider"]
        );
    }
}
