//! Execution plans: the planner's resolved, validated output.

pub mod entities;
pub mod validation;
