//! Domain layer - values, capabilities and errors of the trust-scoring core

pub mod completion;
pub mod error;
pub mod events;
pub mod generation;
pub mod options;
pub mod oracle;
pub mod query;
pub mod retriever;
pub mod trust;

pub use completion::{CompletionEvent, CompletionResult, PipelineEvent, RetrievalEvent};
pub use error::TrustError;
pub use events::{EventSubscriber, SubscriberError, SubscriptionId};
pub use generation::{Generation, GenerationCapability};
pub use options::{CompletionOptions, DEFAULT_TOP_K};
pub use oracle::{validate_scoring_input, ScoreOracle};
pub use query::{ContextChunk, Prompt, Query, DEFAULT_QA_TEMPLATE};
pub use retriever::RetrieverCapability;
pub use trust::{OracleScore, ScoreOutcome, TrustScore};

#[cfg(test)]
pub use generation::mock::MockGenerator;
#[cfg(test)]
pub use oracle::mock::MockScoreOracle;
#[cfg(test)]
pub use retriever::MockRetrieverCapability;
