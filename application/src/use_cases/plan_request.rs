//! Request planning.
//!
//! Resolves a declared [`ExecutionSpec`] into a validated [`ExecutionPlan`]
//! according to the spec's strategy. Planning is the read-only phase: it may
//! call the reasoning optimizer but never touches data sources or tools.

use crate::config::ExecutionParams;
use crate::estimate::estimates_for;
use crate::use_cases::optimize_spec::ReasoningOptimizer;
use maestro_domain::plan::validation::REASONING_CONFIDENCE_FLOOR;
use maestro_domain::{ExecutionPlan, ExecutionSpec, PlanIssue, Strategy, validate_plan};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while building a plan.
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("plan validation failed: {}", format_issues(.issues))]
    Invalid { issues: Vec<PlanIssue> },
}

fn format_issues(issues: &[PlanIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds validated execution plans.
pub struct Planner {
    optimizer: ReasoningOptimizer,
    reasoning_floor: f64,
    latency_baseline: Option<f64>,
}

impl Planner {
    pub fn new(optimizer: ReasoningOptimizer, params: &ExecutionParams) -> Self {
        Self {
            optimizer,
            reasoning_floor: REASONING_CONFIDENCE_FLOOR,
            latency_baseline: params.latency_baseline_override,
        }
    }

    /// Resolve `spec` into a plan for `message`.
    pub async fn build_plan(
        &self,
        spec: &ExecutionSpec,
        message: &str,
    ) -> Result<ExecutionPlan, PlanningError> {
        let plan = match spec.policy.strategy {
            Strategy::Direct => {
                ExecutionPlan::direct(spec.clone(), estimates_for(spec, self.latency_baseline))
            }
            Strategy::Reasoned | Strategy::Adaptive => {
                self.reasoned_plan(spec, message, spec.policy.strategy).await
            }
        };

        let issues = validate_plan(&plan);
        if !issues.is_empty() {
            return Err(PlanningError::Invalid { issues });
        }

        info!(
            strategy = %plan.strategy,
            reasoning_applied = plan.reasoning_applied,
            cost = plan.estimates.cost,
            latency = plan.estimates.latency_seconds,
            "plan built"
        );
        Ok(plan)
    }

    async fn reasoned_plan(
        &self,
        spec: &ExecutionSpec,
        message: &str,
        strategy: Strategy,
    ) -> ExecutionPlan {
        let outcome = self.optimizer.optimize(spec, message).await;

        // Adaptive discards untrustworthy or empty optimizer output and
        // behaves as direct; reasoned commits to it and lets plan
        // validation reject a degenerate result.
        if strategy == Strategy::Adaptive {
            if outcome.confidence < self.reasoning_floor {
                debug!(
                    confidence = outcome.confidence,
                    floor = self.reasoning_floor,
                    "reasoning confidence below floor, using original spec"
                );
                return self.unapplied_plan(
                    spec,
                    strategy,
                    format!(
                        "reasoning confidence {:.2} below floor, using original spec",
                        outcome.confidence
                    ),
                );
            }
            if !outcome.changed {
                return self.unapplied_plan(
                    spec,
                    strategy,
                    "reasoning proposed no changes".to_string(),
                );
            }
        }

        let mut notes = outcome.notes;
        if notes.is_empty() {
            notes.push("applied reasoning adjustments".to_string());
        }
        let estimates = estimates_for(&outcome.spec, self.latency_baseline);
        ExecutionPlan::reasoned(
            spec.clone(),
            outcome.spec,
            strategy,
            outcome.confidence,
            notes,
            estimates,
        )
    }

    /// A plan that keeps the original spec after a reasoning pass that was
    /// not applied.
    fn unapplied_plan(&self, spec: &ExecutionSpec, strategy: Strategy, note: String) -> ExecutionPlan {
        let mut plan =
            ExecutionPlan::direct(spec.clone(), estimates_for(spec, self.latency_baseline));
        plan.strategy = strategy;
        plan.notes = vec![note];
        plan
    }
}
