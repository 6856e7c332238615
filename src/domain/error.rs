use thiserror::Error;

/// Errors surfaced by the trust-scoring core
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrustError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Retrieval error: {message}")]
    Retrieval { message: String, timed_out: bool },

    #[error("Generation error: {provider} - {message}")]
    Generation {
        provider: String,
        message: String,
        timed_out: bool,
    },

    #[error("Score oracle unavailable: {message}")]
    OracleUnavailable { message: String, timed_out: bool },

    #[error("Query {correlation_id} was cancelled")]
    Cancelled { correlation_id: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TrustError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn retrieval_timeout(timeout_ms: u64) -> Self {
        Self::Retrieval {
            message: format!("Retrieval timed out after {}ms", timeout_ms),
            timed_out: true,
        }
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn generation_timeout(provider: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: format!("Generation timed out after {}ms", timeout_ms),
            timed_out: true,
        }
    }

    pub fn oracle_unavailable(message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn oracle_timeout(timeout_ms: u64) -> Self {
        Self::OracleUnavailable {
            message: format!("Scoring timed out after {}ms", timeout_ms),
            timed_out: true,
        }
    }

    pub fn cancelled(correlation_id: impl ToString) -> Self {
        Self::Cancelled {
            correlation_id: correlation_id.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure came from a per-call deadline
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Retrieval { timed_out, .. }
            | Self::Generation { timed_out, .. }
            | Self::OracleUnavailable { timed_out, .. } => *timed_out,
            _ => false,
        }
    }

    /// External-dependency failures the caller may choose to retry.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Retrieval { .. } | Self::Generation { .. } | Self::OracleUnavailable { .. }
        )
    }
}
