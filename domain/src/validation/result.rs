//! Combined validation result.

use super::rubric::RubricScores;
use serde::{Deserialize, Serialize};

/// Weights combining the rule-based and rubric sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationWeights {
    pub rule: f64,
    pub rubric: f64,
}

impl Default for ValidationWeights {
    fn default() -> Self {
        Self {
            rule: 0.3,
            rubric: 0.7,
        }
    }
}

impl ValidationWeights {
    /// Weighted combination, clamped to [0, 1].
    pub fn combine(&self, rule_score: f64, rubric_score: f64) -> f64 {
        (rule_score * self.rule + rubric_score * self.rubric).clamp(0.0, 1.0)
    }
}

/// Result of scoring one candidate response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Rule-based sub-score
    pub rule_score: f64,
    /// Per-dimension rubric breakdown, `None` when the rubric pass was skipped
    pub rubric: Option<RubricScores>,
    /// Normalized rubric sub-score, `None` when the rubric pass was skipped
    pub rubric_score: Option<f64>,
    /// Combined confidence in [0, 1]
    pub confidence: f64,
    pub accepted: bool,
    /// Free-text feedback used to steer the next retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ValidationResult {
    /// Result when the rubric pass was skipped: the rule sub-score stands
    /// alone as the confidence.
    pub fn rules_only(rule_score: f64, accepted: bool, feedback: Option<String>) -> Self {
        Self {
            rule_score,
            rubric: None,
            rubric_score: None,
            confidence: rule_score.clamp(0.0, 1.0),
            accepted,
            feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_weights_are_thirty_seventy() {
        let w = ValidationWeights::default();
        assert_eq!(w.rule, 0.3);
        assert_eq!(w.rubric, 0.7);
    }

    // Regression fixtures from the scoring design.

    #[test]
    fn complete_relevant_answer_combines_to_0_822() {
        let combined = ValidationWeights::default().combine(0.5, 0.96);
        assert!(approx(combined, 0.822));
        assert!(combined >= 0.75);
    }

    #[test]
    fn one_line_refusal_combines_to_0_286() {
        let combined = ValidationWeights::default().combine(0.3, 0.28);
        assert!(approx(combined, 0.286));
        assert!(combined < 0.75);
    }

    #[test]
    fn shallow_answer_combines_to_just_below_threshold() {
        let combined = ValidationWeights::default().combine(0.5, 0.81);
        assert!(approx(combined, 0.717));
        assert!(combined < 0.75);
    }

    #[test]
    fn combination_is_clamped() {
        let w = ValidationWeights {
            rule: 1.0,
            rubric: 1.0,
        };
        assert_eq!(w.combine(0.9, 0.9), 1.0);
    }
}
