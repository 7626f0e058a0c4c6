//! Ports: interfaces between the application layer and the outside world.
//!
//! These four contracts (provider, data source, tool, guardrail) are the
//! only points where the engine touches the rest of the system. The step
//! observer is a passive fifth: it receives trace events but never
//! influences control flow.

pub mod data_source;
pub mod guardrail;
pub mod provider_gateway;
pub mod step_observer;
pub mod tool_executor;
