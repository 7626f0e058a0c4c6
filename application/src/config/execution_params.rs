use serde::{Deserialize, Serialize};

/// Per-process settings for the workflow executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Extra provider attempts on transient errors, per workflow attempt
    #[serde(default = "default_provider_retries")]
    pub provider_retries: u32,

    /// When set, planning uses this measured per-call latency in seconds
    /// instead of the fixed provider overhead
    #[serde(default)]
    pub latency_baseline_override: Option<f64>,
}

fn default_provider_retries() -> u32 {
    2
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            provider_retries: default_provider_retries(),
            latency_baseline_override: None,
        }
    }
}
