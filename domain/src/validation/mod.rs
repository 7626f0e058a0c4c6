//! Confidence validation: rule-based checks, rubric parsing, and score
//! combination. Pure domain logic; the rubric provider call lives in the
//! application layer.

pub mod result;
pub mod rubric;
pub mod rules;
