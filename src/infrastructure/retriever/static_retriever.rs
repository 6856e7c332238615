//! Fixed in-memory context
//!
//! Returns the same ranked chunks for every question. Useful for wiring a
//! pipeline against a known corpus in tests and from the command line.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{ContextChunk, RetrieverCapability, TrustError};

#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    chunks: Vec<ContextChunk>,
}

/// One entry of a context file. Rank defaults to the entry's position.
#[derive(Debug, Deserialize)]
struct ChunkRecord {
    text: String,
    #[serde(alias = "source")]
    source_id: String,
    #[serde(default)]
    rank: Option<u32>,
}

impl StaticRetriever {
    pub fn new(mut chunks: Vec<ContextChunk>) -> Self {
        chunks.sort_by_key(|chunk| chunk.rank);
        Self { chunks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(source_id, text)` pairs, ranked in iteration order
    pub fn from_texts<I, S, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let chunks = texts
            .into_iter()
            .enumerate()
            .map(|(rank, (source_id, text))| ContextChunk::new(text, source_id, rank as u32))
            .collect();

        Self::new(chunks)
    }

    /// Parse a JSON array of `{text, source_id, rank?}` objects
    pub fn from_json(json: &str) -> Result<Self, TrustError> {
        let records: Vec<ChunkRecord> = serde_json::from_str(json)
            .map_err(|e| TrustError::configuration(format!("Invalid context JSON: {}", e)))?;

        let chunks = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let rank = record.rank.unwrap_or(position as u32);
                ContextChunk::new(record.text, record.source_id, rank)
            })
            .collect();

        Ok(Self::new(chunks))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrustError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TrustError::configuration(format!(
                "Cannot read context file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl RetrieverCapability for StaticRetriever {
    async fn retrieve(&self, query_text: &str, k: usize) -> Result<Vec<ContextChunk>, TrustError> {
        debug!(
            query = query_text,
            k = k,
            available = self.chunks.len(),
            "Serving static context"
        );

        Ok(self.chunks.iter().take(k).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retrieve_respects_k_and_rank() {
        let retriever = StaticRetriever::new(vec![
            ContextChunk::new("second", "b", 1),
            ContextChunk::new("first", "a", 0),
            ContextChunk::new("third", "c", 2),
        ]);

        let chunks = retriever.retrieve("anything", 2).await.unwrap();

        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_from_texts_ranks_in_order() {
        let retriever = StaticRetriever::from_texts([
            ("france.txt", "Paris is the capital of France."),
            ("germany.txt", "Berlin is the capital of Germany."),
        ]);

        let chunks = retriever.retrieve("capital", 10).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].rank, 0);
        assert_eq!(chunks[0].source_id, "france.txt");
        assert_eq!(chunks[1].rank, 1);
    }

    #[test]
    fn test_from_json() {
        let retriever = StaticRetriever::from_json(
            r#"[
                {"text": "B", "source": "b.md", "rank": 3},
                {"text": "A", "source_id": "a.md"}
            ]"#,
        )
        .unwrap();

        assert_eq!(retriever.len(), 2);
        assert_eq!(retriever.chunks[0].text, "A");
        assert_eq!(retriever.chunks[0].rank, 1);
        assert_eq!(retriever.chunks[1].text, "B");
        assert_eq!(retriever.chunks[1].source_id, "b.md");
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let result = StaticRetriever::from_json("{not json");
        assert!(matches!(result, Err(TrustError::Configuration { .. })));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = StaticRetriever::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(TrustError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_empty_retriever() {
        let retriever = StaticRetriever::empty();
        assert!(retriever.is_empty());
        assert!(retriever.retrieve("q", 5).await.unwrap().is_empty());
    }
}
