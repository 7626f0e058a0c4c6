//! Guardrail adapters.

mod static_guardrail;

pub use static_guardrail::{GuardrailSettings, StaticGuardrail};
