//! Data source port
//!
//! Defines the interface for fetching ranked context snippets given a query
//! and a filter/limit. A source with no matching results returns an empty
//! list, never an error; errors are reserved for genuine failures
//! (connectivity, bad configuration) and degrade gracefully in the workflow.

use async_trait::async_trait;
use maestro_domain::ContextSnippet;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a data source query.
#[derive(Error, Debug, Clone)]
pub enum DataSourceError {
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// A single retrieval source.
#[async_trait]
pub trait DataSourcePort: Send + Sync {
    /// Source type key this source answers to (e.g. "vector_db")
    fn source_type(&self) -> &str;

    /// Query for ranked snippets. Must return an empty vec when nothing
    /// matches.
    async fn query(
        &self,
        query: &str,
        filter: &HashMap<String, serde_json::Value>,
        limit: usize,
    ) -> Result<Vec<ContextSnippet>, DataSourceError>;
}

/// Registry resolving declared source types to sources.
pub trait DataSourceRegistry: Send + Sync {
    fn get(&self, source_type: &str) -> Option<Arc<dyn DataSourcePort>>;

    fn available_sources(&self) -> Vec<String>;

    fn has_source(&self, source_type: &str) -> bool {
        self.get(source_type).is_some()
    }
}
