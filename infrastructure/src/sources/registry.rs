//! Static data source registry.

use maestro_application::{DataSourcePort, DataSourceRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry holding a fixed set of sources, keyed by source type.
#[derive(Default)]
pub struct StaticDataSourceRegistry {
    sources: HashMap<String, Arc<dyn DataSourcePort>>,
}

impl StaticDataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, source: Arc<dyn DataSourcePort>) -> Self {
        self.sources
            .insert(source.source_type().to_string(), source);
        self
    }
}

impl DataSourceRegistry for StaticDataSourceRegistry {
    fn get(&self, source_type: &str) -> Option<Arc<dyn DataSourcePort>> {
        self.sources.get(source_type).map(Arc::clone)
    }

    fn available_sources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::memory::InMemoryDataSource;

    #[test]
    fn resolves_registered_sources() {
        let registry = StaticDataSourceRegistry::new()
            .register(Arc::new(InMemoryDataSource::new("memory", vec![])))
            .register(Arc::new(InMemoryDataSource::new("kb", vec![])));

        assert!(registry.has_source("memory"));
        assert!(registry.get("kb").is_some());
        assert!(registry.get("vector_db").is_none());
        assert_eq!(registry.available_sources(), vec!["kb", "memory"]);
    }
}
