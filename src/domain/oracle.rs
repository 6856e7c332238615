//! Score oracle trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{CompletionOptions, OracleScore, TrustError};

/// External service estimating how trustworthy an answer to a prompt is
#[async_trait]
pub trait ScoreOracle: Send + Sync + Debug {
    /// Score `answer` as a response to `prompt`.
    ///
    /// Implementations must reject blank input with `InvalidInput` and report
    /// remote failures as `OracleUnavailable`. They never retry.
    async fn score(
        &self,
        prompt: &str,
        answer: &str,
        options: &CompletionOptions,
    ) -> Result<OracleScore, TrustError>;

    /// Get the oracle name
    fn oracle_name(&self) -> &'static str;
}

/// Input checks shared by every oracle implementation
pub fn validate_scoring_input(prompt: &str, answer: &str) -> Result<(), TrustError> {
    if prompt.trim().is_empty() {
        return Err(TrustError::invalid_input("Prompt must not be empty"));
    }

    if answer.trim().is_empty() {
        return Err(TrustError::invalid_input("Answer must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::domain::TrustScore;

    /// Mock oracle returning a fixed score or a fixed error
    #[derive(Debug)]
    pub struct MockScoreOracle {
        trust: f64,
        reason: Option<String>,
        error: Option<TrustError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockScoreOracle {
        pub fn new(trust: f64) -> Self {
            Self {
                trust,
                reason: None,
                error: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
            self.reason = Some(reason.into());
            self
        }

        pub fn failing(error: TrustError) -> Self {
            Self {
                trust: 0.0,
                reason: None,
                error: Some(error),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScoreOracle for MockScoreOracle {
        async fn score(
            &self,
            prompt: &str,
            answer: &str,
            _options: &CompletionOptions,
        ) -> Result<OracleScore, TrustError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            validate_scoring_input(prompt, answer)?;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(error.clone());
            }

            let mut score = OracleScore::new(TrustScore::new(self.trust)?);
            if let Some(ref reason) = self.reason {
                score = score.with_metadata("explanation", serde_json::json!(reason));
            }
            Ok(score)
        }

        fn oracle_name(&self) -> &'static str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockScoreOracle;
    use super::*;

    #[test]
    fn test_validate_scoring_input() {
        assert!(validate_scoring_input("prompt", "answer").is_ok());
        assert!(matches!(
            validate_scoring_input("prompt", ""),
            Err(TrustError::InvalidInput { .. })
        ));
        assert!(matches!(
            validate_scoring_input("prompt", " \n\t"),
            Err(TrustError::InvalidInput { .. })
        ));
        assert!(matches!(
            validate_scoring_input("", "answer"),
            Err(TrustError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_oracle_boundaries() {
        for trust in [0.0, 0.5, 1.0] {
            let oracle = MockScoreOracle::new(trust);
            let score = oracle
                .score("prompt", "answer", &CompletionOptions::default())
                .await
                .unwrap();
            assert_eq!(score.trust.value(), trust);
        }
    }

    #[tokio::test]
    async fn test_mock_oracle_rejects_empty_answer() {
        let oracle = MockScoreOracle::new(0.9);
        let result = oracle.score("prompt", "", &CompletionOptions::default()).await;

        assert!(matches!(result, Err(TrustError::InvalidInput { .. })));
    }
}
