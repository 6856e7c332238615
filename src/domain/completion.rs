//! Completion results and the events published about them

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ScoreOutcome, TrustScore};

/// An answer paired with its trust outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub answer: String,
    pub score: ScoreOutcome,
    /// Model that produced the answer, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CompletionResult {
    pub fn new(answer: impl Into<String>, score: ScoreOutcome) -> Self {
        Self {
            answer: answer.into(),
            score,
            model: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn trust(&self) -> Option<TrustScore> {
        self.score.trust()
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_scored()
    }
}

/// Published once per completion call that produced an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub result: CompletionResult,
}

impl CompletionEvent {
    pub fn new(correlation_id: Uuid, result: CompletionResult) -> Self {
        Self {
            correlation_id,
            timestamp: Utc::now(),
            result,
        }
    }

    pub fn score_present(&self) -> bool {
        self.result.is_scored()
    }
}

/// Published once per successful retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalEvent {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub chunk_count: usize,
}

impl RetrievalEvent {
    pub fn new(correlation_id: Uuid, chunk_count: usize) -> Self {
        Self {
            correlation_id,
            timestamp: Utc::now(),
            chunk_count,
        }
    }
}

/// Every kind of event the pipeline publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineEvent {
    Retrieval(RetrievalEvent),
    Completion(CompletionEvent),
}

impl PipelineEvent {
    pub fn correlation_id(&self) -> Uuid {
        match self {
            Self::Retrieval(event) => event.correlation_id,
            Self::Completion(event) => event.correlation_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "retrieval",
            Self::Completion(_) => "completion",
        }
    }

    pub fn as_completion(&self) -> Option<&CompletionEvent> {
        match self {
            Self::Completion(event) => Some(event),
            Self::Retrieval(_) => None,
        }
    }
}

impl From<CompletionEvent> for PipelineEvent {
    fn from(event: CompletionEvent) -> Self {
        Self::Completion(event)
    }
}

impl From<RetrievalEvent> for PipelineEvent {
    fn from(event: RetrievalEvent) -> Self {
        Self::Retrieval(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_event_score_flag() {
        let scored = CompletionResult::new(
            "Paris",
            ScoreOutcome::scored(TrustScore::new(0.98).unwrap()),
        );
        let unscored = CompletionResult::new("Paris", ScoreOutcome::unavailable("down"));

        assert!(CompletionEvent::new(Uuid::new_v4(), scored).score_present());
        assert!(!CompletionEvent::new(Uuid::new_v4(), unscored).score_present());
    }

    #[test]
    fn test_pipeline_event_kinds() {
        let id = Uuid::new_v4();
        let retrieval: PipelineEvent = RetrievalEvent::new(id, 3).into();
        let completion: PipelineEvent = CompletionEvent::new(
            id,
            CompletionResult::new("a", ScoreOutcome::unavailable("x")),
        )
        .into();

        assert_eq!(retrieval.kind(), "retrieval");
        assert_eq!(completion.kind(), "completion");
        assert_eq!(retrieval.correlation_id(), completion.correlation_id());
        assert!(retrieval.as_completion().is_none());
        assert!(completion.as_completion().is_some());
    }

    #[test]
    fn test_pipeline_event_serialization_is_tagged() {
        let event: PipelineEvent = RetrievalEvent::new(Uuid::nil(), 0).into();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "retrieval");
        assert_eq!(json["chunk_count"], 0);
    }
}
