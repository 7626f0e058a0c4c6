//! Rubric response parsing.
//!
//! The rubric pass asks a model to score a candidate answer on four
//! dimensions (0-25 each) and report a total plus reasoning in a fixed
//! line format:
//!
//! ```text
//! RELEVANCE: 24
//! HELPFULNESS: 23
//! ACCURACY: 25
//! COMPLETENESS: 24
//! SCORE: 96
//! REASONING: Directly answers the question with correct detail.
//! ```
//!
//! Parsing is pure text scanning, no I/O, tolerant of missing dimension
//! lines as long as a total `SCORE:` is present.

use serde::{Deserialize, Serialize};

/// Per-dimension rubric scores, each clamped to 0-25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricScores {
    pub relevance: u8,
    pub helpfulness: u8,
    pub accuracy: u8,
    pub completeness: u8,
}

impl RubricScores {
    pub fn total(&self) -> u32 {
        u32::from(self.relevance)
            + u32::from(self.helpfulness)
            + u32::from(self.accuracy)
            + u32::from(self.completeness)
    }

    /// Total normalized to [0, 1].
    pub fn normalized(&self) -> f64 {
        (f64::from(self.total()) / 100.0).min(1.0)
    }
}

/// Parsed output of the rubric pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricOutcome {
    /// Per-dimension breakdown, when the grader reported one
    pub scores: Option<RubricScores>,
    /// Normalized total in [0, 1]
    pub normalized: f64,
    pub reasoning: String,
}

/// Extract the rubric outcome from a grader response.
///
/// Returns `None` when neither a total `SCORE:` nor a full dimension
/// breakdown can be found; the caller then falls back to keyword checks.
pub fn parse_rubric_response(text: &str) -> Option<RubricOutcome> {
    let mut relevance = None;
    let mut helpfulness = None;
    let mut accuracy = None;
    let mut completeness = None;
    let mut total: Option<u32> = None;
    let mut reasoning = String::new();

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        if let Some(value) = labeled_number(line, "RELEVANCE:") {
            relevance = Some(clamp_dimension(value));
        } else if let Some(value) = labeled_number(line, "HELPFULNESS:") {
            helpfulness = Some(clamp_dimension(value));
        } else if let Some(value) = labeled_number(line, "ACCURACY:") {
            accuracy = Some(clamp_dimension(value));
        } else if let Some(value) = labeled_number(line, "COMPLETENESS:") {
            completeness = Some(clamp_dimension(value));
        } else if let Some(value) = labeled_number(line, "SCORE:") {
            total = Some(value.min(100));
        } else if let Some(rest) = strip_label(line, "REASONING:") {
            reasoning = rest.trim().to_string();
        }
    }

    let scores = match (relevance, helpfulness, accuracy, completeness) {
        (Some(r), Some(h), Some(a), Some(c)) => Some(RubricScores {
            relevance: r,
            helpfulness: h,
            accuracy: a,
            completeness: c,
        }),
        _ => None,
    };

    // The explicit total wins; a full breakdown is an acceptable substitute.
    let normalized = match (total, &scores) {
        (Some(t), _) => f64::from(t) / 100.0,
        (None, Some(s)) => s.normalized(),
        (None, None) => return None,
    };

    if reasoning.is_empty() {
        reasoning = "No reasoning provided".to_string();
    }

    Some(RubricOutcome {
        scores,
        normalized: normalized.clamp(0.0, 1.0),
        reasoning,
    })
}

fn clamp_dimension(value: u32) -> u8 {
    value.min(25) as u8
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    // get() rejects splits inside a multibyte character
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| &line[label.len()..])
}

fn labeled_number(line: &str, label: &str) -> Option<u32> {
    let rest = strip_label(line, label)?;
    let digits: String = rest
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
