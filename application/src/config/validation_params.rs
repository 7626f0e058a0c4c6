use maestro_domain::ValidationWeights;
use serde::{Deserialize, Serialize};

/// Per-process settings for the confidence validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationParams {
    /// Relative weight of rule checks vs. rubric scoring
    #[serde(default)]
    pub weights: ValidationWeights,

    /// Sampling temperature for the rubric scoring call
    #[serde(default = "default_rubric_temperature")]
    pub rubric_temperature: f64,

    /// Token cap for the rubric scoring call
    #[serde(default = "default_rubric_max_tokens")]
    pub rubric_max_tokens: u32,
}

fn default_rubric_temperature() -> f64 {
    0.3
}

fn default_rubric_max_tokens() -> u32 {
    200
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            weights: ValidationWeights::default(),
            rubric_temperature: default_rubric_temperature(),
            rubric_max_tokens: default_rubric_max_tokens(),
        }
    }
}
