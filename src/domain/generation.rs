//! Text generation capability

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionOptions, OracleScore, TrustError};

/// Output of one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Set by backends that score their own answers in the same call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_score: Option<OracleScore>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            inline_score: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_inline_score(mut self, score: OracleScore) -> Self {
        self.inline_score = Some(score);
        self
    }
}

/// Trait for text generation backends (OpenAI-compatible APIs, local models)
#[async_trait]
pub trait GenerationCapability: Send + Sync + Debug {
    /// Generate an answer for a fully assembled prompt
    async fn generate(
        &self,
        prompt_text: &str,
        options: &CompletionOptions,
    ) -> Result<Generation, TrustError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
