//! Two-pass confidence validation.
//!
//! Pass one runs the cheap rule checks; a failed check short-circuits
//! without spending a provider call. Pass two asks a model to grade the
//! candidate against a four-dimension rubric and combines both sub-scores
//! with fixed weights. An unavailable grader scores the candidate at the
//! neutral 0.5, which the usual threshold decision then judges; the retry
//! loop and fallback handle the rest.

use crate::config::ValidationParams;
use crate::ports::provider_gateway::ProviderGateway;
use maestro_domain::{
    Message, ProviderSpec, ValidationResult, parse_rubric_response, run_rule_checks, truncate_str,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Score assumed when the grader output cannot be parsed but sounds positive.
const KEYWORD_PASS_SCORE: f64 = 0.75;
/// Score assumed when the grader is unavailable or its output is opaque.
const NEUTRAL_SCORE: f64 = 0.5;

/// Scores candidate responses against the acceptance threshold.
pub struct ConfidenceValidator {
    gateway: Arc<dyn ProviderGateway>,
    params: ValidationParams,
}

impl ConfidenceValidator {
    pub fn new(gateway: Arc<dyn ProviderGateway>, params: ValidationParams) -> Self {
        Self { gateway, params }
    }

    /// Validate `candidate` as an answer to `message`.
    ///
    /// The rubric pass reuses the plan's provider with validation-specific
    /// generation parameters.
    pub async fn validate(
        &self,
        provider: &ProviderSpec,
        message: &str,
        candidate: &str,
        threshold: f64,
    ) -> ValidationResult {
        let rule = run_rule_checks(candidate);
        if !rule.passed {
            debug!(score = rule.score, "rule check failed, skipping rubric");
            return ValidationResult::rules_only(rule.score, false, rule.feedback);
        }

        let mut grader = provider.clone();
        grader.params.temperature = Some(self.params.rubric_temperature);
        grader.params.max_tokens = Some(self.params.rubric_max_tokens);

        let messages = vec![
            Message::system(
                "You are a strict response grader. Score the candidate answer on \
                 RELEVANCE, HELPFULNESS, ACCURACY and COMPLETENESS (0-25 each), \
                 then report SCORE (the 0-100 total) and a one-line REASONING.",
            ),
            Message::user(format!(
                "Question:\n{message}\n\nCandidate answer:\n{candidate}"
            )),
        ];

        let graded = match self.gateway.invoke(&grader, &messages).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "rubric grader unavailable, scoring at neutral");
                let accepted = NEUTRAL_SCORE >= threshold;
                return ValidationResult {
                    rule_score: rule.score,
                    rubric: None,
                    rubric_score: None,
                    confidence: NEUTRAL_SCORE,
                    accepted,
                    feedback: (!accepted)
                        .then(|| "Validation unavailable; response not scored".into()),
                };
            }
        };

        match parse_rubric_response(&graded) {
            Some(outcome) => {
                let confidence = self.params.weights.combine(rule.score, outcome.normalized);
                let accepted = confidence >= threshold;
                let feedback = (!accepted).then_some(outcome.reasoning);
                ValidationResult {
                    rule_score: rule.score,
                    rubric: outcome.scores,
                    rubric_score: Some(outcome.normalized),
                    confidence,
                    accepted,
                    feedback,
                }
            }
            None => {
                // Keyword fallback for graders that ignore the line format
                let lower = graded.to_lowercase();
                let rubric_score =
                    if lower.contains("acceptable") || lower.contains("good") {
                        KEYWORD_PASS_SCORE
                    } else {
                        NEUTRAL_SCORE
                    };
                let confidence = self.params.weights.combine(rule.score, rubric_score);
                let accepted = confidence >= threshold;
                ValidationResult {
                    rule_score: rule.score,
                    rubric: None,
                    rubric_score: Some(rubric_score),
                    confidence,
                    accepted,
                    feedback: (!accepted)
                        .then(|| truncate_str(&graded, 200).to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::provider_gateway::ProviderError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProviderGateway for ScriptedGateway {
        async fn invoke(
            &self,
            _provider: &ProviderSpec,
            _messages: &[Message],
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    fn validator(gateway: Arc<ScriptedGateway>) -> ConfidenceValidator {
        ConfidenceValidator::new(gateway, ValidationParams::default())
    }

    fn provider() -> ProviderSpec {
        ProviderSpec::new("openai", "gpt-4o-mini")
    }

    const GOOD_ANSWER: &str =
        "Rust is a systems programming language focused on safety and performance.";

    #[tokio::test]
    async fn rule_failure_skips_the_grader() {
        let gateway = ScriptedGateway::new(vec![]);
        let validator = validator(gateway.clone());

        let result = validator
            .validate(&provider(), "what is rust?", "hi", 0.75)
            .await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert!(!result.accepted);
        assert_eq!(result.rule_score, 0.1);
        assert_eq!(result.confidence, 0.1);
        assert!(result.rubric_score.is_none());
    }

    #[tokio::test]
    async fn high_rubric_score_accepts() {
        let gateway = ScriptedGateway::new(vec![Ok(
            "RELEVANCE: 24\nHELPFULNESS: 23\nACCURACY: 25\nCOMPLETENESS: 24\n\
             SCORE: 96\nREASONING: Accurate and complete."
                .into(),
        )]);
        let validator = validator(gateway);

        let result = validator
            .validate(&provider(), "what is rust?", GOOD_ANSWER, 0.75)
            .await;

        assert!(result.accepted);
        assert!((result.confidence - 0.822).abs() < 1e-9);
        assert!(result.feedback.is_none());
    }

    #[tokio::test]
    async fn borderline_rubric_score_rejects_with_feedback() {
        let gateway = ScriptedGateway::new(vec![Ok(
            "SCORE: 81\nREASONING: Correct but shallow.".into(),
        )]);
        let validator = validator(gateway);

        let result = validator
            .validate(&provider(), "what is rust?", GOOD_ANSWER, 0.75)
            .await;

        assert!(!result.accepted);
        assert!((result.confidence - 0.717).abs() < 1e-9);
        assert_eq!(result.feedback.as_deref(), Some("Correct but shallow."));
    }

    #[tokio::test]
    async fn grader_failure_scores_neutral_below_threshold() {
        let gateway = ScriptedGateway::new(vec![Err(ProviderError::Unavailable("503".into()))]);
        let validator = validator(gateway);

        let result = validator
            .validate(&provider(), "what is rust?", GOOD_ANSWER, 0.75)
            .await;

        assert!(!result.accepted);
        assert_eq!(result.confidence, 0.5);
        assert!(result.rubric_score.is_none());
        assert!(result.feedback.as_deref().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn grader_failure_passes_a_permissive_threshold() {
        let gateway = ScriptedGateway::new(vec![Err(ProviderError::Unavailable("503".into()))]);
        let validator = validator(gateway);

        let result = validator
            .validate(&provider(), "what is rust?", GOOD_ANSWER, 0.5)
            .await;

        assert!(result.accepted);
        assert!(result.feedback.is_none());
    }

    #[tokio::test]
    async fn unparseable_grader_output_falls_back_to_keywords() {
        let gateway =
            ScriptedGateway::new(vec![Ok("This answer looks good to me overall.".into())]);
        let validator = validator(gateway);

        let result = validator
            .validate(&provider(), "what is rust?", GOOD_ANSWER, 0.6)
            .await;

        // 0.5 * 0.3 + 0.75 * 0.7
        assert!((result.confidence - 0.675).abs() < 1e-9);
        assert!(result.accepted);
    }
}
