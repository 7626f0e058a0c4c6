//! Application layer for maestro
//!
//! This crate defines the ports (trait interfaces) through which the engine
//! reaches providers, data sources, tools, and guardrails, plus the use
//! cases that orchestrate them: planning, reasoning optimization, workflow
//! execution, and confidence validation.
//!
//! Implementations (adapters) live in the infrastructure layer and are
//! injected at construction; one engine instance per process, no hidden
//! global state.

pub mod config;
pub mod estimate;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, ValidationParams};
pub use estimate::{estimate_cost, estimate_latency, estimates_for};
pub use ports::{
    data_source::{DataSourceError, DataSourcePort, DataSourceRegistry},
    guardrail::{DenialReason, GuardrailDecision, GuardrailPort},
    provider_gateway::{ProviderError, ProviderGateway},
    step_observer::{NoStepObserver, StepEvent, StepObserver},
    tool_executor::{ToolError, ToolExecutorPort},
};
pub use use_cases::{
    execute_plan::{WorkflowError, WorkflowExecutor},
    optimize_spec::{OptimizationOutcome, ReasoningOptimizer},
    plan_request::{Planner, PlanningError},
    process_request::ProcessRequestUseCase,
    validate_response::ConfidenceValidator,
};
