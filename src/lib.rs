//! Trustworthy RAG
//!
//! Attaches a trust score in [0, 1] to every generated answer:
//! - Pluggable retrieval, generation and scoring behind async traits
//! - Answering client that generates, scores and publishes one event per answer
//! - Instance-scoped event bus with per-subscriber failure isolation
//! - RAG facade returning the answer, its trust score and its sources

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CompletionOptions, CompletionResult, ContextChunk, PipelineEvent, Query, ScoreOutcome,
    TrustError, TrustScore,
};
pub use infrastructure::answering::AnsweringClient;
pub use infrastructure::events::EventBus;
pub use infrastructure::rag::{RagAnswer, RagFacade};
