use std::future::Future;
use std::time::Duration;

use crate::domain::TrustError;

/// Run `call` under an optional deadline. An elapsed deadline becomes the
/// error built by `on_timeout`, so each external call keeps its own error kind.
pub async fn with_deadline<T, F>(
    timeout: Option<Duration>,
    call: F,
    on_timeout: impl FnOnce() -> TrustError,
) -> Result<T, TrustError>
where
    F: Future<Output = Result<T, TrustError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(on_timeout())),
        None => call.await,
    }
}
