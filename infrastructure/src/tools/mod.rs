//! Tool executor adapters.

mod builtin;

pub use builtin::BuiltinToolExecutor;
