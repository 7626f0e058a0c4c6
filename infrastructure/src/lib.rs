//! Infrastructure layer for maestro
//!
//! Adapters implementing the application-layer ports: an HTTP provider
//! gateway, in-memory data sources, builtin tools, a static guardrail, and
//! the JSONL step trace writer, plus the TOML configuration loader.

pub mod config;
pub mod guardrails;
pub mod logging;
pub mod providers;
pub mod sources;
pub mod tools;

pub use config::{ConfigLoader, FileConfig};
pub use guardrails::{GuardrailSettings, StaticGuardrail};
pub use logging::JsonlStepObserver;
pub use providers::HttpProviderGateway;
pub use sources::{InMemoryDataSource, SourceDocument, StaticDataSourceRegistry};
pub use tools::BuiltinToolExecutor;
