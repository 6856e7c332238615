//! Answering client
//!
//! One generation call, then one scoring call, then exactly one completion
//! event. A failed generation produces neither a score request nor an event.
//! A failed score leaves the answer intact and marks the score unavailable.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    CompletionEvent, CompletionOptions, CompletionResult, Generation, GenerationCapability,
    OracleScore, Prompt, ScoreOracle, ScoreOutcome, TrustError,
};
use crate::infrastructure::deadline::with_deadline;
use crate::infrastructure::events::EventBus;

/// Generates an answer and attaches a trust score to it
#[derive(Debug, Clone)]
pub struct AnsweringClient {
    generator: Arc<dyn GenerationCapability>,
    oracle: Arc<dyn ScoreOracle>,
    bus: Arc<EventBus>,
}

impl AnsweringClient {
    pub fn new(
        generator: Arc<dyn GenerationCapability>,
        oracle: Arc<dyn ScoreOracle>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            generator,
            oracle,
            bus,
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Answer `prompt` and score the answer
    pub async fn complete(
        &self,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, TrustError> {
        let generation = self.generate(prompt, options).await?;

        let (score, metadata) = match generation.inline_score.clone() {
            Some(inline) => {
                debug!(correlation_id = %prompt.correlation_id(), "Using score returned with the answer");
                (ScoreOutcome::scored(inline.trust), inline.metadata)
            }
            None => self.score(prompt, &generation, options).await,
        };

        let result = CompletionResult::new(generation.text, score)
            .with_model(generation.model)
            .with_metadata(metadata);

        let report = self
            .bus
            .publish(CompletionEvent::new(prompt.correlation_id(), result.clone()));

        debug!(
            correlation_id = %prompt.correlation_id(),
            scored = result.is_scored(),
            subscribers = report.attempted,
            failed_subscribers = report.failed,
            "Completion event published"
        );

        Ok(result)
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> Result<Generation, TrustError> {
        let provider = self.generator.provider_name();

        with_deadline(
            options.timeout(),
            self.generator.generate(prompt.text(), options),
            || TrustError::generation_timeout(provider, options.timeout_ms.unwrap_or_default()),
        )
        .await
        .inspect_err(|e| {
            warn!(
                correlation_id = %prompt.correlation_id(),
                provider = provider,
                error = %e,
                "Generation failed"
            )
        })
    }

    async fn score(
        &self,
        prompt: &Prompt,
        generation: &Generation,
        options: &CompletionOptions,
    ) -> (ScoreOutcome, HashMap<String, serde_json::Value>) {
        let scored: Result<OracleScore, TrustError> = with_deadline(
            options.timeout(),
            self.oracle.score(prompt.text(), &generation.text, options),
            || TrustError::oracle_timeout(options.timeout_ms.unwrap_or_default()),
        )
        .await;

        match scored {
            Ok(score) => (ScoreOutcome::scored(score.trust), score.metadata),
            Err(e) => {
                warn!(
                    correlation_id = %prompt.correlation_id(),
                    oracle = self.oracle.oracle_name(),
                    error = %e,
                    "Scoring failed, returning answer without a score"
                );
                (ScoreOutcome::unavailable(e.to_string()), HashMap::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{MockGenerator, MockScoreOracle, TrustScore};
    use crate::infrastructure::events::CollectingSubscriber;

    struct Harness {
        client: AnsweringClient,
        oracle: Arc<MockScoreOracle>,
        collector: Arc<CollectingSubscriber>,
    }

    fn harness(generator: MockGenerator, oracle: MockScoreOracle) -> Harness {
        let bus = Arc::new(EventBus::new());
        let collector = Arc::new(CollectingSubscriber::new());
        bus.subscribe_shared(collector.clone());

        let oracle = Arc::new(oracle);
        let client = AnsweringClient::new(Arc::new(generator), oracle.clone(), bus);

        Harness {
            client,
            oracle,
            collector,
        }
    }

    #[tokio::test]
    async fn test_complete_scores_and_publishes_once() {
        let h = harness(
            MockGenerator::new("Paris"),
            MockScoreOracle::new(0.98).with_reason("consistent with context"),
        );
        let prompt = Prompt::new("What is the capital of France?");

        let result = h
            .client
            .complete(&prompt, &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(result.answer, "Paris");
        assert_eq!(result.trust().map(|t| t.value()), Some(0.98));
        assert_eq!(result.model.as_deref(), Some("mock-model"));
        assert_eq!(
            result.metadata.get("explanation"),
            Some(&serde_json::json!("consistent with context"))
        );
        assert_eq!(h.oracle.calls(), 1);

        let events = h.collector.completions();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, prompt.correlation_id());
        assert!(events[0].score_present());
        assert_eq!(events[0].result, result);
    }

    #[tokio::test]
    async fn test_boundary_scores_are_real_scores() {
        for trust in [0.0, 1.0] {
            let h = harness(MockGenerator::new("answer"), MockScoreOracle::new(trust));

            let result = h
                .client
                .complete(&Prompt::new("prompt"), &CompletionOptions::default())
                .await
                .unwrap();

            assert!(result.is_scored());
            assert_eq!(result.trust(), Some(TrustScore::new(trust).unwrap()));
        }
    }

    #[tokio::test]
    async fn test_generation_failure_skips_scoring_and_event() {
        let h = harness(
            MockGenerator::with_error("model overloaded"),
            MockScoreOracle::new(0.9),
        );

        let result = h
            .client
            .complete(&Prompt::new("prompt"), &CompletionOptions::default())
            .await;

        assert!(matches!(result, Err(TrustError::Generation { .. })));
        assert_eq!(h.oracle.calls(), 0);
        assert!(h.collector.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_marks_score_unavailable() {
        let h = harness(
            MockGenerator::new("Paris"),
            MockScoreOracle::failing(TrustError::oracle_unavailable("connection refused")),
        );

        let result = h
            .client
            .complete(&Prompt::new("prompt"), &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(result.answer, "Paris");
        assert!(!result.is_scored());
        assert_eq!(result.trust(), None);
        assert!(matches!(result.score, ScoreOutcome::Unavailable { .. }));

        let events = h.collector.completions();
        assert_eq!(events.len(), 1);
        assert!(!events[0].score_present());
    }

    #[tokio::test]
    async fn test_empty_answer_is_returned_unscored() {
        let h = harness(MockGenerator::new(""), MockScoreOracle::new(0.9));

        let result = h
            .client
            .complete(&Prompt::new("prompt"), &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(result.answer, "");
        assert!(!result.is_scored());
        assert_eq!(h.collector.completions().len(), 1);
    }

    #[tokio::test]
    async fn test_inline_score_skips_oracle() {
        let generation = Generation::new("Paris")
            .with_inline_score(OracleScore::new(TrustScore::new(0.77).unwrap()));
        let h = harness(
            MockGenerator::with_generation(generation),
            MockScoreOracle::new(0.1),
        );

        let result = h
            .client
            .complete(&Prompt::new("prompt"), &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(result.trust().map(|t| t.value()), Some(0.77));
        assert_eq!(h.oracle.calls(), 0);
        assert_eq!(h.collector.completions().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let h = harness(
            MockGenerator::new("late").with_delay(Duration::from_secs(5)),
            MockScoreOracle::new(0.9),
        );
        let options = CompletionOptions::new().with_timeout_ms(20);

        let error = h
            .client
            .complete(&Prompt::new("prompt"), &options)
            .await
            .unwrap_err();

        assert!(matches!(error, TrustError::Generation { .. }));
        assert!(error.is_timeout());
        assert!(h.collector.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_timeout_keeps_answer() {
        let h = harness(
            MockGenerator::new("Paris"),
            MockScoreOracle::new(0.9).with_delay(Duration::from_secs(5)),
        );
        let options = CompletionOptions::new().with_timeout_ms(20);

        let result = h
            .client
            .complete(&Prompt::new("prompt"), &options)
            .await
            .unwrap();

        assert_eq!(result.answer, "Paris");
        match result.score {
            ScoreOutcome::Unavailable { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected unavailable score, got {:?}", other),
        }
        assert_eq!(h.collector.completions().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_completions_publish_one_event_each() {
        let h = harness(MockGenerator::new("answer"), MockScoreOracle::new(0.6));
        let prompts: Vec<Prompt> = (0..16).map(|i| Prompt::new(format!("prompt {}", i))).collect();
        let options = CompletionOptions::default();

        let results = futures::future::join_all(
            prompts
                .iter()
                .map(|prompt| h.client.complete(prompt, &options)),
        )
        .await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(h.collector.completions().len(), prompts.len());
        for prompt in &prompts {
            assert_eq!(h.collector.completions_for(prompt.correlation_id()).len(), 1);
        }
    }
}
