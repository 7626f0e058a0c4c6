//! Execution plan entities.

use crate::spec::entities::ExecutionSpec;
use crate::spec::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// Advisory cost and latency estimates for a plan.
///
/// Estimates never block execution on their own; they exist for
/// observability and optional caller-supplied budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    /// Estimated cost in USD
    pub cost: f64,
    /// Estimated wall-clock latency in seconds
    pub latency_seconds: f64,
}

impl Estimates {
    pub fn new(cost: f64, latency_seconds: f64) -> Self {
        Self {
            cost,
            latency_seconds,
        }
    }
}

/// A resolved plan: the (original, optimized) spec pair plus how it was made.
///
/// Invariants:
/// - strategy `Direct` implies `optimized == original`
/// - strategy `Adaptive` with reasoning confidence below the floor behaves
///   as `Direct` (the optimizer's suggestion is discarded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub original: ExecutionSpec,
    pub optimized: ExecutionSpec,
    pub strategy: Strategy,
    /// Whether the optimizer's output was actually applied
    pub reasoning_applied: bool,
    /// The optimizer's self-reported confidence (1.0 for direct plans)
    pub reasoning_confidence: f64,
    /// Rationale notes from planning
    pub notes: Vec<String>,
    pub estimates: Estimates,
}

impl ExecutionPlan {
    /// Build a direct plan: the optimized spec is the original, verbatim.
    pub fn direct(spec: ExecutionSpec, estimates: Estimates) -> Self {
        Self {
            original: spec.clone(),
            optimized: spec,
            strategy: Strategy::Direct,
            reasoning_applied: false,
            reasoning_confidence: 1.0,
            notes: vec!["skipped reasoning as requested".to_string()],
            estimates,
        }
    }

    /// Build a plan from applied optimizer output.
    pub fn reasoned(
        original: ExecutionSpec,
        optimized: ExecutionSpec,
        strategy: Strategy,
        confidence: f64,
        notes: Vec<String>,
        estimates: Estimates,
    ) -> Self {
        Self {
            original,
            optimized,
            strategy,
            reasoning_applied: true,
            reasoning_confidence: confidence,
            notes,
            estimates,
        }
    }
}
