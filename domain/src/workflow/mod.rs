//! Workflow state machine types.

pub mod response;
pub mod state;
