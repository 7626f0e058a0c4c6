//! Execution specifications: the declarative "what to do" from agents.

pub mod entities;
pub mod strategy;
