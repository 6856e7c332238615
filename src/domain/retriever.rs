use std::fmt::Debug;

use async_trait::async_trait;

use super::{ContextChunk, TrustError};

/// Source of ranked context for a question (vector stores, search indexes)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrieverCapability: Send + Sync + Debug {
    /// Return at most `k` chunks, most relevant first
    async fn retrieve(&self, query_text: &str, k: usize) -> Result<Vec<ContextChunk>, TrustError>;
}
