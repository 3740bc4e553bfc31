//! Pre-flight retry policy for the provider transport.
//!
//! Retries are applied ONLY to pre-flight failures — connection refused,
//! DNS failure, TLS handshake failure, or a non-2xx status observed before
//! any byte of a streaming body was read. Once a response body has started
//! streaming, no retry is attempted; SPEC_FULL §4.1/§7 treat that failure as
//! a `ProviderTransport`/`ProviderDeadline` error surfaced to the caller.

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use backoff::future::retry;

use crate::error::CoreError;

/// Retry a pre-flight operation with exponential backoff. `operation` must
/// return `Err(CoreError::ProviderTransport(_))` for retryable failures;
/// any other error kind is propagated immediately without retrying.
pub async fn retry_preflight<F, Fut, T>(operation: F) -> Result<T, CoreError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, CoreError>>,
{
    let backoff_policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(200))
        .with_max_interval(Duration::from_secs(5))
        .with_max_elapsed_time(Some(Duration::from_secs(20)))
        .build();

    retry(backoff_policy, || async {
        operation().await.map_err(|e| match e {
            CoreError::ProviderTransport(_) => backoff::Error::transient(e),
            other => backoff::Error::permanent(other),
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transport_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, CoreError> = retry_preflight(|| async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(CoreError::ProviderTransport("connect refused".into()))
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transport_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, CoreError> = retry_preflight(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::AgentParseError {
                agent: "daw".into(),
                reason: "bad chord".into(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
