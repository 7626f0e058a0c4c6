//! Top-level request processing.
//!
//! The facade the outer layers call: guardrail check, planning, workflow
//! execution, response assembly. Guardrail denials and planning errors are
//! the only hard failures; a workflow that never reaches the confidence
//! threshold still reports success with fallback content.

use crate::use_cases::execute_plan::{WorkflowError, WorkflowExecutor};
use crate::use_cases::plan_request::Planner;
use crate::ports::guardrail::{GuardrailDecision, GuardrailPort};
use maestro_domain::{
    EngineRequest, EngineResponse, ExecutionSpec, ResponseMetadata, ResponseStatus, WorkflowState,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Processes one request end to end.
pub struct ProcessRequestUseCase {
    guardrail: Arc<dyn GuardrailPort>,
    planner: Planner,
    executor: WorkflowExecutor,
}

impl ProcessRequestUseCase {
    pub fn new(
        guardrail: Arc<dyn GuardrailPort>,
        planner: Planner,
        executor: WorkflowExecutor,
    ) -> Self {
        Self {
            guardrail,
            planner,
            executor,
        }
    }

    /// Run `request` against `spec`.
    ///
    /// Never panics and never returns an error: every outcome is expressed
    /// in the response envelope.
    pub async fn process(&self, request: &EngineRequest, spec: &ExecutionSpec) -> EngineResponse {
        let started = Instant::now();
        info!(
            application = %request.application,
            session_id = %request.session_id,
            strategy = %spec.policy.strategy,
            "processing request"
        );

        let mut request = request.clone();
        request.message = self.guardrail.sanitize(&request.message);

        let decision = self
            .guardrail
            .check(request.identity(), &request.application, &request.message)
            .await;
        if let GuardrailDecision::Deny(reason) = decision {
            warn!(identity = request.identity(), ?reason, "request denied");
            return EngineResponse::failure(reason.message(), elapsed(started));
        }

        let plan = match self.planner.build_plan(spec, &request.message).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "planning failed");
                return EngineResponse::failure(err.to_string(), elapsed(started));
            }
        };

        match self.executor.execute(&request, &plan).await {
            Ok(state) => assemble_response(state, elapsed(started)),
            Err(WorkflowError::Cancelled) => {
                EngineResponse::failure("request cancelled", elapsed(started))
            }
        }
    }
}

fn elapsed(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}

fn assemble_response(state: WorkflowState, duration_seconds: f64) -> EngineResponse {
    EngineResponse {
        success: true,
        content: state.candidate.unwrap_or_default(),
        confidence: state.confidence,
        status: ResponseStatus::Completed,
        metadata: ResponseMetadata {
            execution_steps: state.steps,
            confidence_score: state.confidence,
            validation_attempts: state.attempt_count,
            errors: state.errors,
            duration_seconds,
        },
    }
}
