//! Domain layer for maestro
//!
//! This crate contains the core orchestration types and pure business logic.
//! It has no dependencies on infrastructure or I/O concerns.
//!
//! # Core Concepts
//!
//! ## Two-phase execution
//!
//! Every request is satisfied in two phases:
//!
//! - **Planning**: an [`ExecutionSpec`] declared by the calling agent is
//!   resolved into an [`ExecutionPlan`] (direct, reasoned, or adaptive)
//! - **Execution**: a workflow runs the plan stage by stage, gating the
//!   generated answer behind a confidence score
//!
//! ## Confidence validation
//!
//! A candidate answer is scored by a rule-based pass and a rubric pass,
//! combined with fixed weights. Low confidence is not an error: the workflow
//! retries with feedback until the attempt budget runs out, then substitutes
//! a fallback answer.

pub mod fallback;
pub mod message;
pub mod plan;
pub mod request;
pub mod spec;
pub mod util;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use fallback::{FALLBACK_MESSAGES, fallback_content};
pub use message::{Message, Role};
pub use plan::{
    entities::{Estimates, ExecutionPlan},
    validation::{PlanIssue, validate_plan},
};
pub use request::EngineRequest;
pub use util::truncate_str;
pub use spec::{
    entities::{
        DataSourceBinding, ExecutionSpec, GenerationParams, ProcessingPolicy, ProviderSpec,
        ToolBinding,
    },
    strategy::Strategy,
};
pub use validation::{
    result::{ValidationResult, ValidationWeights},
    rubric::{RubricOutcome, RubricScores, parse_rubric_response},
    rules::{REFUSAL_PATTERNS, RuleOutcome, run_rule_checks},
};
pub use workflow::{
    response::{EngineResponse, ResponseMetadata, ResponseStatus},
    state::{ContextSnippet, ToolOutcome, WorkflowState, WorkflowStatus, WorkflowStep},
};
