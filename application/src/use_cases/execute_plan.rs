//! Workflow execution.
//!
//! Runs an execution plan through the staged workflow:
//!
//! ```text
//! initialize -> gather_context -> invoke_tools -> compose_prompt
//!     -> invoke_provider -> validate_response -> finalize
//! ```
//!
//! The only loop edge runs from validation back to prompt composition while
//! confidence is below threshold and the attempt budget remains. A failed
//! provider stage consumes one attempt at zero confidence and takes the same
//! edge. Data source and tool failures degrade to recorded notes; only
//! cancellation aborts the workflow, everything else finalizes with either
//! the accepted candidate or fallback content.

use crate::config::ExecutionParams;
use crate::ports::data_source::DataSourceRegistry;
use crate::ports::provider_gateway::{ProviderError, ProviderGateway};
use crate::ports::step_observer::{StepEvent, StepObserver};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::validate_response::ConfidenceValidator;
use chrono::Utc;
use futures::future::join_all;
use maestro_domain::{
    ContextSnippet, EngineRequest, ExecutionPlan, ExecutionSpec, Message, ToolOutcome,
    WorkflowState, WorkflowStatus, WorkflowStep, fallback_content, truncate_str,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer accurately and concisely.";
/// Byte cap on the previous candidate echoed into a retry prompt.
const RETRY_CANDIDATE_CAP: usize = 500;

/// Errors that abort the workflow outright.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("workflow cancelled")]
    Cancelled,
}

/// Drives one plan through the staged workflow.
pub struct WorkflowExecutor {
    gateway: Arc<dyn ProviderGateway>,
    sources: Arc<dyn DataSourceRegistry>,
    tools: Arc<dyn ToolExecutorPort>,
    validator: ConfidenceValidator,
    observer: Arc<dyn StepObserver>,
    params: ExecutionParams,
    cancellation: CancellationToken,
}

impl WorkflowExecutor {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        sources: Arc<dyn DataSourceRegistry>,
        tools: Arc<dyn ToolExecutorPort>,
        validator: ConfidenceValidator,
        observer: Arc<dyn StepObserver>,
        params: ExecutionParams,
    ) -> Self {
        Self {
            gateway,
            sources,
            tools,
            validator,
            observer,
            params,
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token; cancelling it aborts in-flight workflows
    /// at the next stage boundary.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Execute `plan` for `request`, returning the final workflow state.
    pub async fn execute(
        &self,
        request: &EngineRequest,
        plan: &ExecutionPlan,
    ) -> Result<WorkflowState, WorkflowError> {
        let spec = &plan.optimized;
        let execution_id = format!("exec_{}", Utc::now().timestamp_millis());
        info!(
            execution_id = %execution_id,
            strategy = %plan.strategy,
            "workflow started"
        );

        let mut state = WorkflowState::new(&execution_id, spec.policy.max_attempts)
            .record_step(WorkflowStep::Initialize);
        self.observe(&state, WorkflowStep::Initialize);

        if spec.has_enabled_sources() {
            self.ensure_active()?;
            state = self.gather_context(state, spec, &request.message).await;
            self.observe(&state, WorkflowStep::GatherContext);
        }

        if spec.has_enabled_tools() {
            self.ensure_active()?;
            state = self.invoke_tools(state, spec).await;
            self.observe(&state, WorkflowStep::InvokeTools);
        }

        loop {
            self.ensure_active()?;

            let messages = compose_messages(spec, &request.message, &state);
            state = state
                .with_messages(messages)
                .record_step(WorkflowStep::ComposePrompt);
            self.observe(&state, WorkflowStep::ComposePrompt);

            state = state.record_step(WorkflowStep::InvokeProvider);
            match self.invoke_provider(spec, &state).await? {
                Ok(text) => state = state.with_candidate(text),
                Err(err) => {
                    warn!(error = %err, "provider invocation failed");
                    // A failed provider call consumes the attempt at zero
                    // confidence; remaining budget retries from composition
                    state = state
                        .push_error(format!("provider error: {err}"))
                        .next_attempt()
                        .with_validation(0.0, false, None);
                    self.observe(&state, WorkflowStep::InvokeProvider);
                    if state.budget_remaining() {
                        continue;
                    }
                    break;
                }
            }
            self.observe(&state, WorkflowStep::InvokeProvider);

            self.ensure_active()?;
            state = state.next_attempt();
            let candidate = state.candidate.clone().unwrap_or_default();
            let result = self
                .validator
                .validate(
                    &spec.provider,
                    &request.message,
                    &candidate,
                    spec.policy.confidence_threshold,
                )
                .await;
            state = state
                .with_validation(result.confidence, result.accepted, result.feedback)
                .record_step(WorkflowStep::ValidateResponse);
            self.observe(&state, WorkflowStep::ValidateResponse);

            if state.accepted {
                break;
            }
            if !state.budget_remaining() {
                debug!(
                    attempts = state.attempt_count,
                    confidence = state.confidence,
                    "attempt budget exhausted"
                );
                break;
            }
        }

        // Unaccepted candidates are replaced; true confidence stays in state
        if !state.accepted {
            state = state.with_candidate(fallback_content());
        }
        let status = if state.errors.is_empty() {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::CompletedWithErrors
        };
        state = state.finalized(status).record_step(WorkflowStep::Finalize);
        self.observe(&state, WorkflowStep::Finalize);
        info!(
            execution_id = %execution_id,
            status = state.status.as_str(),
            confidence = state.confidence,
            attempts = state.attempt_count,
            "workflow finished"
        );

        Ok(state)
    }

    /// Query all enabled sources concurrently; failures become recorded
    /// errors, not aborts.
    async fn gather_context(
        &self,
        state: WorkflowState,
        spec: &ExecutionSpec,
        message: &str,
    ) -> WorkflowState {
        let queries = spec.enabled_sources().map(|binding| {
            let registry = Arc::clone(&self.sources);
            async move {
                let Some(source) = registry.get(&binding.source_type) else {
                    return Err(format!("unknown data source: {}", binding.source_type));
                };
                let query = binding.query.as_deref().unwrap_or(message);
                source
                    .query(query, &binding.filter, binding.limit)
                    .await
                    .map_err(|err| format!("data source {} failed: {err}", binding.source_type))
            }
        });

        let mut snippets: Vec<ContextSnippet> = Vec::new();
        let mut state = state;
        for result in join_all(queries).await {
            match result {
                Ok(batch) => snippets.extend(batch),
                Err(note) => state = state.push_error(note),
            }
        }
        snippets.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(snippets = snippets.len(), "context gathered");

        state
            .with_snippets(snippets)
            .record_step(WorkflowStep::GatherContext)
    }

    /// Invoke all enabled tools concurrently.
    async fn invoke_tools(&self, state: WorkflowState, spec: &ExecutionSpec) -> WorkflowState {
        let invocations = spec.enabled_tools().map(|binding| {
            let tools = Arc::clone(&self.tools);
            async move {
                if !tools.has_tool(&binding.name) {
                    return ToolOutcome::unavailable(&binding.name, "tool not available");
                }
                match tools.invoke(&binding.name, &binding.args).await {
                    Ok(output) => ToolOutcome::success(&binding.name, output),
                    Err(err) => ToolOutcome::unavailable(&binding.name, err.to_string()),
                }
            }
        });

        let outcomes = join_all(invocations).await;
        debug!(tools = outcomes.len(), "tools invoked");
        state
            .with_tool_outcomes(outcomes)
            .record_step(WorkflowStep::InvokeTools)
    }

    /// Invoke the provider with a per-call timeout, retrying transient
    /// errors within the configured budget.
    async fn invoke_provider(
        &self,
        spec: &ExecutionSpec,
        state: &WorkflowState,
    ) -> Result<Result<String, ProviderError>, WorkflowError> {
        let timeout = Duration::from_secs(spec.policy.timeout_secs);
        let mut last_error = ProviderError::EmptyResponse;

        for attempt in 0..=self.params.provider_retries {
            let outcome = tokio::select! {
                _ = self.cancellation.cancelled() => return Err(WorkflowError::Cancelled),
                outcome = tokio::time::timeout(
                    timeout,
                    self.gateway.invoke(&spec.provider, &state.messages),
                ) => outcome,
            };

            let error = match outcome {
                Ok(Ok(text)) => return Ok(Ok(text)),
                Ok(Err(err)) => err,
                Err(_) => ProviderError::Timeout,
            };

            if error.is_transient() && attempt < self.params.provider_retries {
                debug!(attempt, error = %error, "transient provider error, retrying");
                last_error = error;
                continue;
            }
            return Ok(Err(error));
        }

        Ok(Err(last_error))
    }

    fn ensure_active(&self) -> Result<(), WorkflowError> {
        if self.cancellation.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }
        Ok(())
    }

    fn observe(&self, state: &WorkflowState, step: WorkflowStep) {
        let event = StepEvent::new(
            step.as_str(),
            &state.execution_id,
            serde_json::json!({
                "attempt": state.attempt_count,
                "confidence": state.confidence,
                "accepted": state.accepted,
                "snippets": state.snippets.len(),
                "errors": state.errors.len(),
                "status": state.status.as_str(),
            }),
        );
        self.observer.record(&event);
    }
}

/// Build the message sequence for one provider attempt.
///
/// Retry attempts replay the rejected candidate and its feedback so the
/// provider can improve rather than repeat itself.
pub fn compose_messages(
    spec: &ExecutionSpec,
    user_message: &str,
    state: &WorkflowState,
) -> Vec<Message> {
    let mut system = spec
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    if !state.snippets.is_empty() {
        system.push_str("\n\nRelevant context:");
        for snippet in &state.snippets {
            system.push_str(&format!("\n- [{}] {}", snippet.source_id, snippet.text));
        }
    }

    if !state.tool_outcomes.is_empty() {
        system.push_str("\n\nTool results:");
        for outcome in &state.tool_outcomes {
            match (&outcome.output, &outcome.note) {
                (Some(output), _) => {
                    system.push_str(&format!("\n- {}: {output}", outcome.tool));
                }
                (None, Some(note)) => {
                    system.push_str(&format!("\n- {}: {note}", outcome.tool));
                }
                (None, None) => {}
            }
        }
    }

    let mut messages = vec![Message::system(system), Message::user(user_message)];

    if let (Some(candidate), Some(feedback)) = (&state.candidate, &state.feedback) {
        messages.push(Message::assistant(truncate_str(
            candidate,
            RETRY_CANDIDATE_CAP,
        )));
        messages.push(Message::user(format!(
            "Your previous answer was not accepted: {feedback}\nProvide an improved answer."
        )));
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationParams;
    use crate::ports::data_source::{DataSourceError, DataSourcePort};
    use crate::ports::step_observer::NoStepObserver;
    use crate::ports::tool_executor::ToolError;
    use async_trait::async_trait;
    use maestro_domain::{
        DataSourceBinding, ProcessingPolicy, ProviderSpec, ToolBinding,
    };
    use std::collections::{HashMap, VecDeque};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderGateway for ScriptedGateway {
        async fn invoke(
            &self,
            _provider: &ProviderSpec,
            _messages: &[Message],
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    struct FixedSource {
        snippets: Vec<ContextSnippet>,
    }

    #[async_trait]
    impl DataSourcePort for FixedSource {
        fn source_type(&self) -> &str {
            "vector_db"
        }

        async fn query(
            &self,
            _query: &str,
            _filter: &HashMap<String, serde_json::Value>,
            limit: usize,
        ) -> Result<Vec<ContextSnippet>, DataSourceError> {
            Ok(self.snippets.iter().take(limit).cloned().collect())
        }
    }

    struct SingleSourceRegistry {
        source: Arc<dyn DataSourcePort>,
    }

    impl DataSourceRegistry for SingleSourceRegistry {
        fn get(&self, source_type: &str) -> Option<Arc<dyn DataSourcePort>> {
            (source_type == self.source.source_type()).then(|| Arc::clone(&self.source))
        }

        fn available_sources(&self) -> Vec<String> {
            vec![self.source.source_type().to_string()]
        }
    }

    struct EmptyRegistry;

    impl DataSourceRegistry for EmptyRegistry {
        fn get(&self, _source_type: &str) -> Option<Arc<dyn DataSourcePort>> {
            None
        }

        fn available_sources(&self) -> Vec<String> {
            vec![]
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolExecutorPort for NoTools {
        fn has_tool(&self, _name: &str) -> bool {
            false
        }

        fn available_tools(&self) -> Vec<String> {
            vec![]
        }

        async fn invoke(
            &self,
            name: &str,
            _args: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, ToolError> {
            Err(ToolError::UnknownTool(name.to_string()))
        }
    }

    struct RecordingObserver {
        events: Mutex<Vec<StepEvent>>,
    }

    impl RecordingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }
    }

    impl StepObserver for RecordingObserver {
        fn record(&self, event: &StepEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    const ACCEPT_GRADE: &str = "SCORE: 96\nREASONING: Accurate and complete.";
    const REJECT_GRADE: &str = "SCORE: 40\nREASONING: Too shallow, add detail.";
    const ANSWER: &str = "Rust is a systems programming language focused on safety.";

    fn executor(gateway: Arc<ScriptedGateway>) -> WorkflowExecutor {
        WorkflowExecutor::new(
            gateway.clone(),
            Arc::new(EmptyRegistry),
            Arc::new(NoTools),
            ConfidenceValidator::new(gateway, ValidationParams::default()),
            Arc::new(NoStepObserver),
            ExecutionParams::default(),
        )
    }

    fn plan_for(spec: ExecutionSpec) -> ExecutionPlan {
        ExecutionPlan::direct(spec, Default::default())
    }

    fn bare_spec() -> ExecutionSpec {
        ExecutionSpec::new(ProviderSpec::new("openai", "gpt-4o-mini"))
    }

    fn request() -> EngineRequest {
        EngineRequest::new("what is rust?", "chat")
    }

    #[tokio::test]
    async fn accepted_first_attempt() {
        let gateway = ScriptedGateway::new(vec![Ok(ANSWER.into()), Ok(ACCEPT_GRADE.into())]);
        let executor = executor(gateway.clone());

        let state = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap();

        assert!(state.accepted);
        assert_eq!(state.candidate.as_deref(), Some(ANSWER));
        assert_eq!(state.attempt_count, 1);
        assert_eq!(state.status, WorkflowStatus::Completed);
        assert_eq!(
            state.steps,
            vec![
                "initialize",
                "compose_prompt",
                "invoke_provider",
                "validate_response",
                "finalize"
            ]
        );
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn rejected_attempt_retries_with_feedback() {
        let gateway = ScriptedGateway::new(vec![
            Ok("A shallow first try.".into()),
            Ok(REJECT_GRADE.into()),
            Ok(ANSWER.into()),
            Ok(ACCEPT_GRADE.into()),
        ]);
        let executor = executor(gateway);

        let state = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap();

        assert!(state.accepted);
        assert_eq!(state.attempt_count, 2);
        assert_eq!(state.candidate.as_deref(), Some(ANSWER));
        // Retry prompt carried the rejected candidate and the feedback
        assert_eq!(state.messages.len(), 4);
        assert!(state.messages[3].content.contains("Too shallow"));
    }

    #[tokio::test]
    async fn exhaustion_substitutes_fallback_and_keeps_confidence() {
        let gateway = ScriptedGateway::new(vec![
            Ok("Weak answer one here.".into()),
            Ok(REJECT_GRADE.into()),
            Ok("Weak answer two here.".into()),
            Ok(REJECT_GRADE.into()),
        ]);
        let executor = executor(gateway);
        let spec = bare_spec().with_policy(ProcessingPolicy::default().with_max_attempts(2));

        let state = executor.execute(&request(), &plan_for(spec)).await.unwrap();

        assert!(!state.accepted);
        assert_eq!(state.attempt_count, 2);
        assert_eq!(state.candidate.as_deref(), Some(fallback_content()));
        // 0.5 * 0.3 + 0.4 * 0.7
        assert!((state.confidence - 0.43).abs() < 1e-9);
        assert_eq!(state.status, WorkflowStatus::Completed);
    }

    #[tokio::test]
    async fn permanent_provider_errors_consume_attempts_until_exhaustion() {
        let gateway = ScriptedGateway::new(vec![
            Err(ProviderError::InvalidRequest("bad".into())),
            Err(ProviderError::InvalidRequest("bad".into())),
        ]);
        let executor = executor(gateway.clone());
        let spec = bare_spec().with_policy(ProcessingPolicy::default().with_max_attempts(2));

        let state = executor.execute(&request(), &plan_for(spec)).await.unwrap();

        assert!(!state.accepted);
        assert_eq!(state.candidate.as_deref(), Some(fallback_content()));
        assert_eq!(state.status, WorkflowStatus::CompletedWithErrors);
        assert_eq!(state.errors.len(), 2);
        assert_eq!(state.attempt_count, 2);
        assert_eq!(state.confidence, 0.0);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_stage_retries_fail_one_attempt_not_the_request() {
        // Three rate limits burn the per-stage retry budget (2 extra calls),
        // failing attempt 1; attempt 2 succeeds and is accepted.
        let gateway = ScriptedGateway::new(vec![
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Ok(ANSWER.into()),
            Ok(ACCEPT_GRADE.into()),
        ]);
        let executor = executor(gateway.clone());

        let state = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap();

        assert!(state.accepted);
        assert_eq!(state.attempt_count, 2);
        assert_eq!(state.candidate.as_deref(), Some(ANSWER));
        assert_eq!(state.status, WorkflowStatus::CompletedWithErrors);
        assert_eq!(state.errors.len(), 1);
        assert_eq!(gateway.call_count(), 5);
    }

    #[tokio::test]
    async fn transient_provider_errors_are_retried() {
        let gateway = ScriptedGateway::new(vec![
            Err(ProviderError::RateLimited),
            Ok(ANSWER.into()),
            Ok(ACCEPT_GRADE.into()),
        ]);
        let executor = executor(gateway.clone());

        let state = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap();

        assert!(state.accepted);
        assert_eq!(gateway.call_count(), 3);
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn gathered_context_lands_in_the_system_prompt() {
        let gateway = ScriptedGateway::new(vec![Ok(ANSWER.into()), Ok(ACCEPT_GRADE.into())]);
        let registry = SingleSourceRegistry {
            source: Arc::new(FixedSource {
                snippets: vec![
                    ContextSnippet::new("Rust ships a borrow checker.", 0.7, "doc-2"),
                    ContextSnippet::new("Rust is memory safe.", 0.9, "doc-1"),
                ],
            }),
        };
        let executor = WorkflowExecutor::new(
            gateway.clone(),
            Arc::new(registry),
            Arc::new(NoTools),
            ConfidenceValidator::new(gateway, ValidationParams::default()),
            Arc::new(NoStepObserver),
            ExecutionParams::default(),
        );
        let spec = bare_spec().with_data_source(DataSourceBinding::new("vector_db"));

        let state = executor.execute(&request(), &plan_for(spec)).await.unwrap();

        assert_eq!(state.snippets.len(), 2);
        // Sorted by score, best first
        assert_eq!(state.snippets[0].source_id, "doc-1");
        assert!(state.messages[0].content.contains("Rust is memory safe."));
        assert!(state.steps.contains(&"gather_context".to_string()));
    }

    #[tokio::test]
    async fn unknown_source_and_tool_degrade_gracefully() {
        let gateway = ScriptedGateway::new(vec![Ok(ANSWER.into()), Ok(ACCEPT_GRADE.into())]);
        let executor = executor(gateway);
        let spec = bare_spec()
            .with_data_source(DataSourceBinding::new("missing_db"))
            .with_tool(ToolBinding::new("missing_tool"));

        let state = executor.execute(&request(), &plan_for(spec)).await.unwrap();

        assert!(state.accepted);
        assert_eq!(state.status, WorkflowStatus::CompletedWithErrors);
        assert!(state.errors[0].contains("missing_db"));
        assert_eq!(state.tool_outcomes.len(), 1);
        assert!(state.tool_outcomes[0].output.is_none());
    }

    #[tokio::test]
    async fn cancellation_aborts_the_workflow() {
        let gateway = ScriptedGateway::new(vec![Ok(ANSWER.into())]);
        let token = CancellationToken::new();
        token.cancel();
        let executor = executor(gateway.clone()).with_cancellation(token);

        let err = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::Cancelled);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn observer_sees_every_recorded_step() {
        let gateway = ScriptedGateway::new(vec![Ok(ANSWER.into()), Ok(ACCEPT_GRADE.into())]);
        let observer = RecordingObserver::new();
        let executor = WorkflowExecutor::new(
            gateway.clone(),
            Arc::new(EmptyRegistry),
            Arc::new(NoTools),
            ConfidenceValidator::new(gateway, ValidationParams::default()),
            observer.clone(),
            ExecutionParams::default(),
        );

        let state = executor
            .execute(&request(), &plan_for(bare_spec()))
            .await
            .unwrap();

        let events = observer.events.lock().unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, state.steps);
        assert!(events.iter().all(|e| e.execution_id == state.execution_id));
    }
}
