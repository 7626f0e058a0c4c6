//! Heuristic cost and latency estimation for execution plans.
//!
//! Estimates are advisory. They appear in plan output and planning logs
//! but never gate execution.

use maestro_domain::{Estimates, ExecutionSpec};

const COST_PER_TOKEN: f64 = 0.000_01;
const COST_PER_SOURCE: f64 = 0.001;
const COST_PER_TOOL: f64 = 0.005;
const DEFAULT_MAX_TOKENS: u32 = 2000;

const LATENCY_BASE: f64 = 0.5;
const LATENCY_PER_SOURCE: f64 = 0.3;
const LATENCY_PER_TOOL: f64 = 0.5;
const PROVIDER_OVERHEAD: f64 = 1.5;

/// Estimated monetary cost of executing `spec`, rounded to 4 decimals.
pub fn estimate_cost(spec: &ExecutionSpec) -> f64 {
    let max_tokens = spec.provider.params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    let sources = spec.enabled_sources().count() as f64;
    let tools = spec.enabled_tools().count() as f64;
    let raw = f64::from(max_tokens) * COST_PER_TOKEN + sources * COST_PER_SOURCE + tools * COST_PER_TOOL;
    round_to(raw, 4)
}

/// Estimated wall-clock latency in seconds, rounded to 2 decimals.
///
/// When a measured baseline is available it replaces the fixed 0.5 s base;
/// the provider overhead term is always added.
pub fn estimate_latency(spec: &ExecutionSpec, baseline: Option<f64>) -> f64 {
    let sources = spec.enabled_sources().count() as f64;
    let tools = spec.enabled_tools().count() as f64;
    let base = baseline.unwrap_or(LATENCY_BASE);
    let raw = base + sources * LATENCY_PER_SOURCE + tools * LATENCY_PER_TOOL + PROVIDER_OVERHEAD;
    round_to(raw, 2)
}

/// Both estimates for a spec.
pub fn estimates_for(spec: &ExecutionSpec, baseline: Option<f64>) -> Estimates {
    Estimates {
        cost: estimate_cost(spec),
        latency_seconds: estimate_latency(spec, baseline),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_domain::{DataSourceBinding, ProviderSpec, ToolBinding};

    fn spec_with(sources: usize, tools: usize, max_tokens: Option<u32>) -> ExecutionSpec {
        let mut provider = ProviderSpec::new("openai", "gpt-4");
        provider.params.max_tokens = max_tokens;
        let mut spec = ExecutionSpec::new(provider);
        for i in 0..sources {
            spec.data_sources
                .push(DataSourceBinding::new(format!("source_{i}")));
        }
        for i in 0..tools {
            spec.tools.push(ToolBinding::new(format!("tool_{i}")));
        }
        spec
    }

    #[test]
    fn cost_uses_default_token_budget() {
        let spec = spec_with(0, 0, None);
        assert!((estimate_cost(&spec) - 0.02).abs() < 1e-9);
    }

    #[test]
    fn cost_counts_sources_and_tools() {
        let spec = spec_with(2, 1, Some(1000));
        // 1000 * 0.00001 + 2 * 0.001 + 1 * 0.005
        assert!((estimate_cost(&spec) - 0.017).abs() < 1e-9);
    }

    #[test]
    fn disabled_bindings_do_not_count() {
        let mut spec = spec_with(1, 1, Some(1000));
        spec.data_sources[0].enabled = false;
        spec.tools[0].enabled = false;
        assert!((estimate_cost(&spec) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn latency_includes_provider_overhead() {
        let spec = spec_with(1, 1, None);
        // 0.5 + 0.3 + 0.5 + 1.5
        assert!((estimate_latency(&spec, None) - 2.8).abs() < 1e-9);
    }

    #[test]
    fn latency_baseline_replaces_the_fixed_base() {
        let spec = spec_with(0, 0, None);
        // 0.8 + 1.5
        assert!((estimate_latency(&spec, Some(0.8)) - 2.3).abs() < 1e-9);
    }
}
