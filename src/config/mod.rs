mod app_config;

pub use app_config::{
    AppConfig, GenerationConfig, LogFormat, LoggingConfig, OracleConfig, PipelineConfig,
    OPENAI_API_KEY_ENV, ORACLE_API_KEY_ENV,
};
