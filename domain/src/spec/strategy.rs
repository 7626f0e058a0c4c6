//! Planning strategy selection.

use serde::{Deserialize, Serialize};

/// How the planner resolves an [`ExecutionSpec`](super::entities::ExecutionSpec)
/// into an execution plan.
///
/// - **Direct**: use the spec verbatim, no extra model call. Lowest latency.
/// - **Reasoned**: always run the reasoning optimizer and use its output,
///   accepting added latency for higher quality.
/// - **Adaptive**: run the optimizer but only apply its output when its
///   self-reported confidence clears the floor; otherwise behave as Direct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Direct,
    Reasoned,
    Adaptive,
}

impl Strategy {
    pub fn as_str(&self) -> &str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Reasoned => "reasoned",
            Strategy::Adaptive => "adaptive",
        }
    }

    /// Whether this strategy invokes the reasoning optimizer at all.
    pub fn uses_reasoning(&self) -> bool {
        matches!(self, Strategy::Reasoned | Strategy::Adaptive)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Strategy::Direct),
            "reasoned" => Ok(Strategy::Reasoned),
            "adaptive" => Ok(Strategy::Adaptive),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}
