//! In-memory keyword-scored data source.
//!
//! Documents are scored by the fraction of query terms they contain.
//! Zero-score documents are dropped, the rest are returned best first up
//! to the binding's limit. Intended for seeded knowledge bases and tests;
//! real retrieval backends implement the same port.

use async_trait::async_trait;
use maestro_application::{DataSourceError, DataSourcePort};
use maestro_domain::ContextSnippet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document held by an in-memory source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Keyword-matching source over a fixed document set.
pub struct InMemoryDataSource {
    source_type: String,
    documents: Vec<SourceDocument>,
}

impl InMemoryDataSource {
    pub fn new(source_type: impl Into<String>, documents: Vec<SourceDocument>) -> Self {
        Self {
            source_type: source_type.into(),
            documents,
        }
    }
}

fn score(query_terms: &[String], text: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let text = text.to_lowercase();
    let matched = query_terms.iter().filter(|t| text.contains(*t)).count();
    matched as f64 / query_terms.len() as f64
}

fn matches_filter(doc: &SourceDocument, filter: &HashMap<String, serde_json::Value>) -> bool {
    match filter.get("tag").and_then(|v| v.as_str()) {
        Some(tag) => doc.tags.iter().any(|t| t == tag),
        None => true,
    }
}

#[async_trait]
impl DataSourcePort for InMemoryDataSource {
    fn source_type(&self) -> &str {
        &self.source_type
    }

    async fn query(
        &self,
        query: &str,
        filter: &HashMap<String, serde_json::Value>,
        limit: usize,
    ) -> Result<Vec<ContextSnippet>, DataSourceError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<ContextSnippet> = self
            .documents
            .iter()
            .filter(|doc| matches_filter(doc, filter))
            .filter_map(|doc| {
                let score = score(&terms, &doc.text);
                (score > 0.0).then(|| ContextSnippet::new(&doc.text, score, &doc.id))
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }
}
