//! Step trace adapters.

mod jsonl_observer;

pub use jsonl_observer::JsonlStepObserver;
