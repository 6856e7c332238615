use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{CompletionOptions, Generation, GenerationCapability, TrustError};
use crate::infrastructure::http_client::{HttpClientTrait, HttpError};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const PROVIDER: &str = "openai";

/// Generator backed by an OpenAI-compatible chat completions API
pub struct OpenAiGenerator<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    default_model: String,
}

impl<C: HttpClientTrait> OpenAiGenerator<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            default_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt_text: &str, options: &CompletionOptions) -> serde_json::Value {
        let model = options.model.as_deref().unwrap_or(&self.default_model);
        let messages = vec![OpenAiMessage {
            role: "user".to_string(),
            content: Some(prompt_text.to_string()),
        }];

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = options.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Generation, TrustError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            TrustError::generation(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TrustError::generation(PROVIDER, "No choices in response"))?;

        let mut generation = Generation::new(choice.message.content.unwrap_or_default());
        if let Some(model) = response.model {
            generation = generation.with_model(model);
        }

        Ok(generation)
    }

    fn map_http_error(error: HttpError, options: &CompletionOptions) -> TrustError {
        match error {
            HttpError::Timeout => {
                TrustError::generation_timeout(PROVIDER, options.timeout_ms.unwrap_or_default())
            }
            other => TrustError::generation(PROVIDER, other.to_string()),
        }
    }
}

impl<C: HttpClientTrait> fmt::Debug for OpenAiGenerator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("auth_header", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl<C: HttpClientTrait> GenerationCapability for OpenAiGenerator<C> {
    async fn generate(
        &self,
        prompt_text: &str,
        options: &CompletionOptions,
    ) -> Result<Generation, TrustError> {
        let url = self.chat_completions_url();
        let body = self.build_request(prompt_text, options);

        debug!(
            model = body["model"].as_str().unwrap_or_default(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post_json(&url, self.headers(), &body, options.timeout())
            .await
            .map_err(|e| Self::map_http_error(e, options))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}
