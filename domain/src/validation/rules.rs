//! Rule-based validation pass.
//!
//! Cheap sequential checks applied before the rubric pass. Any failed check
//! yields a low fixed sub-score; passing all checks yields the 0.5 base.

/// Patterns that indicate a refusal or canned apology rather than an answer.
pub const REFUSAL_PATTERNS: &[&str] = &[
    "i cannot",
    "i can't",
    "i don't have",
    "i'm unable",
    "as an ai",
    "i apologize, but",
    "i'm sorry, but",
];

/// Sub-score awarded when every rule check passes.
pub const RULE_PASS_SCORE: f64 = 0.5;

/// Outcome of the rule-based pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Sub-score in [0, 1]; 0.5 when all checks pass
    pub score: f64,
    pub passed: bool,
    /// Feedback for the retry prompt when a check failed
    pub feedback: Option<String>,
}

impl RuleOutcome {
    fn failed(score: f64, feedback: &str) -> Self {
        Self {
            score,
            passed: false,
            feedback: Some(feedback.to_string()),
        }
    }
}

/// Run the sequential rule checks against a candidate response.
///
/// Checks, in order: minimum length (10 chars), minimum word count (3),
/// absence of refusal patterns in short responses.
pub fn run_rule_checks(response: &str) -> RuleOutcome {
    if response.trim().len() < 10 {
        return RuleOutcome::failed(0.1, "Response is too short");
    }

    if response.split_whitespace().count() < 3 {
        return RuleOutcome::failed(0.2, "Response lacks substance");
    }

    let lower = response.to_lowercase();
    if response.len() < 100 && REFUSAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return RuleOutcome::failed(0.3, "Response appears to be a refusal or error message");
    }

    RuleOutcome {
        score: RULE_PASS_SCORE,
        passed: true,
        feedback: None,
    }
}
