//! Step observer port
//!
//! Receives a trace event after each workflow stage transition. Observers
//! are passive: the executor never branches on what an observer does, and
//! observer failures must not surface into the workflow.

use serde::Serialize;

/// A single trace event emitted after a stage completes.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvent {
    pub event_type: String,
    pub execution_id: String,
    pub payload: serde_json::Value,
}

impl StepEvent {
    pub fn new(
        event_type: impl Into<String>,
        execution_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            execution_id: execution_id.into(),
            payload,
        }
    }
}

/// Port for workflow tracing.
pub trait StepObserver: Send + Sync {
    fn record(&self, event: &StepEvent);
}

/// Observer that discards all events.
#[derive(Debug, Default)]
pub struct NoStepObserver;

impl StepObserver for NoStepObserver {
    fn record(&self, _event: &StepEvent) {}
}
