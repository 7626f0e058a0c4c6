//! Tunable parameters for the application layer.
//!
//! Per-request knobs (confidence threshold, attempt budget, timeout) live
//! on `ProcessingPolicy` in the domain; the structs here carry per-process
//! settings injected at engine construction.

mod execution_params;
mod validation_params;

pub use execution_params::ExecutionParams;
pub use validation_params::ValidationParams;
