//! Pre-execution plan validation.
//!
//! After building a plan whose strategy involved reasoning, the planner
//! validates the optimizer's output before handing off to the workflow.
//! Any issue aborts planning; the workflow is never invoked with a plan
//! that fails these checks.

use super::entities::ExecutionPlan;
use thiserror::Error;

/// Floor below which reasoning output is considered untrustworthy.
pub const REASONING_CONFIDENCE_FLOOR: f64 = 0.3;

/// A single failed plan-validation check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanIssue {
    #[error("no provider specified in optimized spec")]
    MissingProvider,

    #[error("no model specified in optimized spec")]
    MissingModel,

    #[error("reasoning confidence too low: {0:.2}")]
    LowReasoningConfidence(f64),

    #[error("reasoning applied but optimized spec is unchanged")]
    SpecUnchanged,

    #[error("invalid estimated cost: {0}")]
    NegativeCost(f64),

    #[error("invalid estimated latency: {0}")]
    NegativeLatency(f64),
}

/// Validate a plan, returning every failed check.
///
/// Checks, in order:
/// 1. provider and model are both specified in the optimized spec
/// 2. if reasoning was applied: confidence clears the floor
/// 3. if reasoning was applied: the optimized spec differs from the
///    original in at least one field
/// 4. cost and latency estimates are non-negative
pub fn validate_plan(plan: &ExecutionPlan) -> Vec<PlanIssue> {
    let mut issues = Vec::new();

    if plan.optimized.provider.provider.trim().is_empty() {
        issues.push(PlanIssue::MissingProvider);
    }
    if plan.optimized.provider.model.trim().is_empty() {
        issues.push(PlanIssue::MissingModel);
    }

    if plan.reasoning_applied {
        if plan.reasoning_confidence < REASONING_CONFIDENCE_FLOOR {
            issues.push(PlanIssue::LowReasoningConfidence(plan.reasoning_confidence));
        }

        // Field-order independent structural comparison
        let original = serde_json::to_value(&plan.original).unwrap_or_default();
        let optimized = serde_json::to_value(&plan.optimized).unwrap_or_default();
        if original == optimized {
            issues.push(PlanIssue::SpecUnchanged);
        }
    }

    if plan.estimates.cost < 0.0 {
        issues.push(PlanIssue::NegativeCost(plan.estimates.cost));
    }
    if plan.estimates.latency_seconds < 0.0 {
        issues.push(PlanIssue::NegativeLatency(plan.estimates.latency_seconds));
    }

    issues
}
