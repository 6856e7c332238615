use serde::Deserialize;

use crate::domain::{CompletionOptions, DEFAULT_TOP_K};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ORACLE_API_KEY_ENV: &str = "TRUST_ORACLE_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
    pub oracle: OracleConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-compatible chat endpoint
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Remote trust scoring endpoint
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_k: usize,
    /// Applied to each external call separately
    pub timeout_ms: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            api_key: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            timeout_ms: Some(30_000),
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.resolve_api_keys(|name| std::env::var(name).ok());

        Ok(app_config)
    }

    /// Fill missing API keys from the conventional environment variables
    pub fn resolve_api_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.generation.api_key.is_none() {
            self.generation.api_key = lookup(OPENAI_API_KEY_ENV);
        }
        if self.oracle.api_key.is_none() {
            self.oracle.api_key = lookup(ORACLE_API_KEY_ENV);
        }
    }

    /// Baseline options for every query; per-query options override them
    pub fn completion_options(&self) -> CompletionOptions {
        let mut options = CompletionOptions::new()
            .with_model(self.generation.model.clone())
            .with_top_k(self.pipeline.top_k);

        if let Some(max_tokens) = self.generation.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.generation.temperature {
            options = options.with_temperature(temperature);
        }
        if let Some(timeout_ms) = self.pipeline.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }

        options
    }
}
