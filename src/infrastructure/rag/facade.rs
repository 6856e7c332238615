//! RAG orchestration facade
//!
//! Retrieves context, assembles a grounded prompt and hands it to the
//! answering client. Each call runs its own [`QueryLifecycle`]; nothing is
//! kept between queries.

use std::collections::HashMap;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::{QueryLifecycle, QueryState};
use crate::domain::{
    CompletionOptions, ContextChunk, Prompt, Query, RetrievalEvent, RetrieverCapability,
    ScoreOutcome, TrustError, DEFAULT_QA_TEMPLATE,
};
use crate::infrastructure::answering::AnsweringClient;
use crate::infrastructure::deadline::with_deadline;

/// Answer to a query, with its trust outcome and the context it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    pub correlation_id: Uuid,
    pub answer: String,
    pub trust: ScoreOutcome,
    /// Chunks in the order they appeared in the prompt
    pub sources: Vec<ContextChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Oracle-provided details such as a score explanation
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RagAnswer {
    pub fn trust_value(&self) -> Option<f64> {
        self.trust.trust().map(|t| t.value())
    }

    pub fn source_texts(&self) -> Vec<&str> {
        self.sources.iter().map(|chunk| chunk.text.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RagFacade {
    client: AnsweringClient,
    template: String,
}

impl RagFacade {
    pub fn new(client: AnsweringClient) -> Self {
        Self {
            client,
            template: DEFAULT_QA_TEMPLATE.to_string(),
        }
    }

    /// Replace the QA template. `{context}` and `{query}` are substituted.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn client(&self) -> &AnsweringClient {
        &self.client
    }

    /// Answer `query` using context from `retriever`
    pub async fn answer(
        &self,
        query: &Query,
        retriever: &dyn RetrieverCapability,
        options: &CompletionOptions,
    ) -> Result<RagAnswer, TrustError> {
        self.answer_with_cancellation(query, retriever, options, &CancellationToken::new())
            .await
    }

    /// Like [`RagFacade::answer`], stopping early when `cancel` fires.
    ///
    /// Cancelled before generation is issued: no generation call is made and
    /// no completion event is published. Cancelled after:
    /// the in-flight completion still finishes and publishes its event, but
    /// this call returns `Cancelled`.
    pub async fn answer_with_cancellation(
        &self,
        query: &Query,
        retriever: &dyn RetrieverCapability,
        options: &CompletionOptions,
        cancel: &CancellationToken,
    ) -> Result<RagAnswer, TrustError> {
        let mut lifecycle = QueryLifecycle::new(query.id);

        if let Err(e) = query.validate() {
            lifecycle.fail();
            return Err(e);
        }

        let options = options.merged_with(query.options.as_ref());

        info!(
            correlation_id = %query.id,
            top_k = options.top_k(),
            "Answering query"
        );

        if cancel.is_cancelled() {
            lifecycle.fail();
            return Err(TrustError::cancelled(query.id));
        }

        lifecycle.advance(QueryState::Retrieving);
        let chunks = match self.retrieve(query, retriever, &options, cancel).await {
            Ok(chunks) => chunks,
            Err(e) => {
                lifecycle.fail();
                return Err(e);
            }
        };

        // No await between this check and the spawn below.
        if cancel.is_cancelled() {
            debug!(correlation_id = %query.id, "Query cancelled after retrieval");
            lifecycle.fail();
            return Err(TrustError::cancelled(query.id));
        }

        self.client
            .bus()
            .publish(RetrievalEvent::new(query.id, chunks.len()));

        lifecycle.advance(QueryState::Assembling);
        let prompt = Prompt::assemble_with_template(&self.template, query, chunks);
        if !prompt.has_context() {
            debug!(correlation_id = %query.id, "No context retrieved, answering without it");
        }

        lifecycle.advance(QueryState::GeneratingAndScoring);
        let completion = self.spawn_completion(prompt.clone(), options);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(
                    correlation_id = %query.id,
                    "Query cancelled during generation, completion left to finish"
                );
                Err(TrustError::cancelled(query.id))
            }
            joined = completion => joined.map_err(|e| {
                TrustError::generation("runtime", format!("Completion task failed: {}", e))
            }).and_then(|result| result),
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                lifecycle.fail();
                return Err(e);
            }
        };

        lifecycle.advance(QueryState::Done);

        info!(
            correlation_id = %query.id,
            trust = %result.score,
            sources = prompt.chunks().len(),
            "Query answered"
        );

        Ok(RagAnswer {
            correlation_id: query.id,
            answer: result.answer,
            trust: result.score,
            sources: prompt.chunks().to_vec(),
            model: result.model,
            metadata: result.metadata,
        })
    }

    async fn retrieve(
        &self,
        query: &Query,
        retriever: &dyn RetrieverCapability,
        options: &CompletionOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContextChunk>, TrustError> {
        let retrieval = with_deadline(
            options.timeout(),
            retriever.retrieve(&query.text, options.top_k()),
            || TrustError::retrieval_timeout(options.timeout_ms.unwrap_or_default()),
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TrustError::cancelled(query.id)),
            result = retrieval => result.inspect_err(|e| {
                warn!(correlation_id = %query.id, error = %e, "Retrieval failed")
            }),
        }
    }

    /// Run the completion on its own task so dropping the caller's future
    /// cannot cut it short.
    fn spawn_completion(
        &self,
        prompt: Prompt,
        options: CompletionOptions,
    ) -> tokio::task::JoinHandle<Result<crate::domain::CompletionResult, TrustError>> {
        let client = self.client.clone();
        tokio::spawn(async move { client.complete(&prompt, &options).await })
    }
}
