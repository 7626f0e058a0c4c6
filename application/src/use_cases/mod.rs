//! Use cases orchestrating the ports.

pub mod execute_plan;
pub mod optimize_spec;
pub mod plan_request;
pub mod process_request;
pub mod validate_response;
