//! Built-in event subscribers

use std::sync::{Mutex, PoisonError};

use metrics::{counter, histogram};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    CompletionEvent, EventSubscriber, PipelineEvent, SubscriberError, TrustScore,
};

/// Keeps every event it receives. Each instance owns its own storage, so two
/// pipelines (or two tests) never see each other's events.
#[derive(Debug, Default)]
pub struct CollectingSubscriber {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.lock().clone()
    }

    pub fn completions(&self) -> Vec<CompletionEvent> {
        self.lock()
            .iter()
            .filter_map(|event| event.as_completion().cloned())
            .collect()
    }

    pub fn completions_for(&self, correlation_id: Uuid) -> Vec<CompletionEvent> {
        self.completions()
            .into_iter()
            .filter(|event| event.correlation_id == correlation_id)
            .collect()
    }

    /// Trust score of the most recent scored completion
    pub fn latest_trust(&self) -> Option<TrustScore> {
        self.lock()
            .iter()
            .rev()
            .filter_map(PipelineEvent::as_completion)
            .find_map(|event| event.result.trust())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PipelineEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &PipelineEvent) -> Result<(), SubscriberError> {
        self.lock().push(event.clone());
        Ok(())
    }

    fn subscriber_name(&self) -> &str {
        "collector"
    }
}

/// Writes each event to the tracing pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSubscriber;

impl EventSubscriber for TracingSubscriber {
    fn on_event(&self, event: &PipelineEvent) -> Result<(), SubscriberError> {
        match event {
            PipelineEvent::Retrieval(retrieval) => {
                debug!(
                    correlation_id = %retrieval.correlation_id,
                    chunks = retrieval.chunk_count,
                    "Context retrieved"
                );
            }
            PipelineEvent::Completion(completion) => {
                info!(
                    correlation_id = %completion.correlation_id,
                    model = completion.result.model.as_deref().unwrap_or("unknown"),
                    scored = completion.score_present(),
                    trust = %completion.result.score,
                    "Completion finished"
                );
            }
        }
        Ok(())
    }

    fn subscriber_name(&self) -> &str {
        "tracing"
    }
}

/// Records counters and a trust histogram through the `metrics` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsSubscriber;

impl EventSubscriber for MetricsSubscriber {
    fn on_event(&self, event: &PipelineEvent) -> Result<(), SubscriberError> {
        match event {
            PipelineEvent::Retrieval(retrieval) => {
                counter!("trust_retrievals_total").increment(1);
                histogram!("trust_retrieved_chunks").record(retrieval.chunk_count as f64);
            }
            PipelineEvent::Completion(completion) => {
                let scored = if completion.score_present() { "true" } else { "false" };
                counter!("trust_completions_total", "scored" => scored).increment(1);

                if let Some(trust) = completion.result.trust() {
                    histogram!("trust_score").record(trust.value());
                }
            }
        }
        Ok(())
    }

    fn subscriber_name(&self) -> &str {
        "metrics"
    }
}
