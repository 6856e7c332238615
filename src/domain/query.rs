//! Query, retrieved context and prompt assembly

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CompletionOptions, TrustError};

/// Question-answering template. `{context}` holds the chunk texts, `{query}`
/// the question.
pub const DEFAULT_QA_TEMPLATE: &str = "Context information is below.\n\
---------------------\n\
{context}\n\
---------------------\n\
Given the context information and not prior knowledge, answer the query.\n\
Query: {query}\n\
Answer: ";

const CHUNK_SEPARATOR: &str = "\n\n";

/// A user question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Correlates the query with the events it produces
    pub id: Uuid,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CompletionOptions>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn validate(&self) -> Result<(), TrustError> {
        if self.text.trim().is_empty() {
            return Err(TrustError::invalid_input("Query text must not be empty"));
        }
        Ok(())
    }
}

/// A span of retrieved text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub text: String,
    pub source_id: String,
    /// Position in the retriever's ranking, 0 is the most relevant
    pub rank: u32,
}

impl ContextChunk {
    pub fn new(text: impl Into<String>, source_id: impl Into<String>, rank: u32) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            rank,
        }
    }

    fn assembly_order(a: &ContextChunk, b: &ContextChunk) -> Ordering {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.source_id.cmp(&b.source_id))
    }
}

/// Prompt sent to the generator, assembled once per query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    correlation_id: Uuid,
    text: String,
    chunks: Vec<ContextChunk>,
}

impl Prompt {
    /// A prompt with no retrieved context
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            text: text.into(),
            chunks: Vec::new(),
        }
    }

    /// Build a grounded prompt with the default template
    pub fn assemble(query: &Query, chunks: Vec<ContextChunk>) -> Self {
        Self::assemble_with_template(DEFAULT_QA_TEMPLATE, query, chunks)
    }

    /// Chunks are ordered by rank, ties broken by source id, so static
    /// input always yields the same text.
    pub fn assemble_with_template(
        template: &str,
        query: &Query,
        mut chunks: Vec<ContextChunk>,
    ) -> Self {
        chunks.sort_by(ContextChunk::assembly_order);

        let context = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        let text = fill_template(template, &context, &query.text);

        Self {
            correlation_id: query.id,
            text,
            chunks,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> &[ContextChunk] {
        &self.chunks
    }

    pub fn has_context(&self) -> bool {
        !self.chunks.is_empty()
    }
}

/// Substitute `{context}` and `{query}` in a single pass over the template.
/// Inserted text is never rescanned, so placeholders inside retrieved
/// chunks or the question stay literal.
fn fill_template(template: &str, context: &str, query: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + query.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{query}") {
            out.push_str(query);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
