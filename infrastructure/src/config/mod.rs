//! Configuration loading.

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileLoggingConfig, FileProviderConfig};
pub use loader::ConfigLoader;
