//! Data source adapters.

mod memory;
mod registry;

pub use memory::{InMemoryDataSource, SourceDocument};
pub use registry::StaticDataSourceRegistry;
