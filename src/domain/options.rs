//! Runtime options shared by generation, scoring and retrieval

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of chunks requested from a retriever
pub const DEFAULT_TOP_K: usize = 2;

/// Options recognized across components.
///
/// Every field is optional so that a query-level set can be layered over
/// facade-level defaults with [`CompletionOptions::merged_with`].
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Generation backend model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Deadline applied to each external call independently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Oracle authentication, overrides the adapter's configured key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Number of context chunks to retrieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Fields set in `overrides` win over the ones set here
    pub fn merged_with(&self, overrides: Option<&CompletionOptions>) -> CompletionOptions {
        let Some(overrides) = overrides else {
            return self.clone();
        };

        CompletionOptions {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            temperature: overrides.temperature.or(self.temperature),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            api_key: overrides.api_key.clone().or_else(|| self.api_key.clone()),
            top_k: overrides.top_k.or(self.top_k),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

impl fmt::Debug for CompletionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionOptions")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("top_k", &self.top_k)
            .finish()
    }
}
