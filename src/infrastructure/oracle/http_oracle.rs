//! HTTP score oracle
//!
//! Talks to a hosted trustworthiness model: the prompt and the candidate
//! answer go out, a score in [0, 1] with optional explanation comes back.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{
    validate_scoring_input, CompletionOptions, OracleScore, ScoreOracle, TrustError, TrustScore,
};
use crate::infrastructure::http_client::{HttpClientTrait, HttpError};

const SCORE_PATH: &str = "/v1/score";

/// Score oracle reached over HTTP(S)
pub struct HttpScoreOracle<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: Option<String>,
}

impl<C: HttpClientTrait> HttpScoreOracle<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn score_url(&self) -> String {
        format!("{}{}", self.base_url, SCORE_PATH)
    }

    fn build_request(
        &self,
        prompt: &str,
        answer: &str,
        options: &CompletionOptions,
    ) -> serde_json::Value {
        let mut model_options = serde_json::Map::new();

        if let Some(ref model) = options.model {
            model_options.insert("model".to_string(), serde_json::json!(model));
        }

        if let Some(max_tokens) = options.max_tokens {
            model_options.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }

        if let Some(temperature) = options.temperature {
            model_options.insert("temperature".to_string(), serde_json::json!(temperature));
        }

        serde_json::json!({
            "prompt": prompt,
            "response": answer,
            "options": model_options,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<OracleScore, TrustError> {
        let response: ScoreResponse = serde_json::from_value(json).map_err(|e| {
            TrustError::oracle_unavailable(format!("Malformed oracle response: {}", e))
        })?;

        let trust = TrustScore::new(response.trust).map_err(|_| {
            warn!(trust = response.trust, "Oracle returned an out-of-range score");
            TrustError::oracle_unavailable(format!(
                "Oracle returned out-of-range score {}",
                response.trust
            ))
        })?;

        Ok(OracleScore {
            trust,
            metadata: response.metadata,
        })
    }
}

impl<C: HttpClientTrait> fmt::Debug for HttpScoreOracle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpScoreOracle")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(alias = "trustworthiness_score")]
    trust: f64,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl<C: HttpClientTrait> ScoreOracle for HttpScoreOracle<C> {
    async fn score(
        &self,
        prompt: &str,
        answer: &str,
        options: &CompletionOptions,
    ) -> Result<OracleScore, TrustError> {
        validate_scoring_input(prompt, answer)?;

        let api_key = options
            .api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .ok_or_else(|| TrustError::oracle_unavailable("No oracle API key configured"))?;
        let auth_header = format!("Bearer {}", api_key);
        let headers = vec![
            ("Authorization", auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let body = self.build_request(prompt, answer, options);

        debug!(url = %self.score_url(), "Requesting trust score");

        let response = self
            .client
            .post_json(&self.score_url(), headers, &body, options.timeout())
            .await
            .map_err(|e| match e {
                HttpError::Timeout => {
                    TrustError::oracle_timeout(options.timeout_ms.unwrap_or_default())
                }
                other => TrustError::oracle_unavailable(other.to_string()),
            })?;

        self.parse_response(response)
    }

    fn oracle_name(&self) -> &'static str {
        "http"
    }
}
