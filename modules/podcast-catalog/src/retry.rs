use std::future::Future;
use std::time::Duration;

use leadgen_common::ProviderError;

/// Shared retry/backoff policy for both catalog provider clients (spec
/// §4.1): up to 3 retries with exponential backoff starting at 1s; 401
/// fails fast as a configuration error; 429 honors `Retry-After` (falling
/// back to the current backoff) and still consumes a retry; 5xx retries;
/// other 4xx fails fast with the body preserved.
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

/// Outcome of a single attempt, as classified by the caller from the raw
/// HTTP response. The policy only knows how to retry/backoff/fail-fast;
/// classifying a status code is the caller's job (it knows the response
/// shape).
pub enum AttemptOutcome<T> {
    /// Call succeeded; return the value.
    Success(T),
    /// 401: fail the whole call immediately as a configuration error.
    Unauthorized(String),
    /// 429: retry after `retry_after` (falls back to current backoff if `None`).
    RateLimited { retry_after: Option<Duration> },
    /// 5xx: retry with exponential backoff.
    ServerError { status: u16, body: String },
    /// Other 4xx: fail the whole call immediately, body preserved.
    ClientError { status: u16, body: String },
}

impl RetryPolicy {
    /// Execute `attempt` up to `max_retries + 1` times per the policy
    /// above. `attempt` performs one HTTP call and classifies its outcome.
    pub async fn execute<T, F, Fut>(&self, mut attempt: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<AttemptOutcome<T>, ProviderError>>,
    {
        let mut backoff = self.initial_backoff;
        let mut retries = 0u32;

        loop {
            match attempt().await {
                Ok(AttemptOutcome::Success(value)) => return Ok(value),
                Ok(AttemptOutcome::Unauthorized(body)) => {
                    return Err(ProviderError::Unauthorized(body));
                }
                Ok(AttemptOutcome::ClientError { status, body }) => {
                    return Err(ProviderError::ClientError { status, body });
                }
                Ok(AttemptOutcome::ServerError { status, body }) => {
                    if retries >= self.max_retries {
                        return Err(ProviderError::ServerError { status, body });
                    }
                    tracing::warn!(status, retries, "server error, retrying");
                    tokio::time::sleep(backoff).await;
                    retries += 1;
                    backoff *= 2;
                }
                Ok(AttemptOutcome::RateLimited { retry_after }) => {
                    if retries >= self.max_retries {
                        return Err(ProviderError::RateLimited);
                    }
                    let wait = retry_after.unwrap_or(backoff);
                    tracing::warn!(?wait, retries, "rate limited, retrying");
                    tokio::time::sleep(wait).await;
                    retries += 1;
                    backoff *= 2;
                }
                Err(ProviderError::Timeout) => {
                    if retries >= self.max_retries {
                        return Err(ProviderError::Timeout);
                    }
                    tracing::warn!(retries, "request timed out, retrying");
                    tokio::time::sleep(backoff).await;
                    retries += 1;
                    backoff *= 2;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_server_errors_then_succeeds() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
        };
        let attempts = AtomicU32::new(0);
        let result = policy
            .execute(|| async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Ok(AttemptOutcome::ServerError {
                        status: 503,
                        body: "oops".to_string(),
                    })
                } else {
                    Ok(AttemptOutcome::Success(42))
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unauthorized_fails_fast_without_retry() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);
        let result: Result<i32, _> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(AttemptOutcome::Unauthorized("bad key".to_string()))
            })
            .await;
        assert!(matches!(result, Err(ProviderError::Unauthorized(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_error_fails_fast_with_body_preserved() {
        let policy = RetryPolicy::default();
        let result: Result<i32, _> = policy
            .execute(|| async {
                Ok(AttemptOutcome::ClientError {
                    status: 404,
                    body: "not found".to_string(),
                })
            })
            .await;
        match result {
            Err(ProviderError::ClientError { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            _ => panic!("expected ClientError"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_honors_retry_after_then_fails_when_exhausted() {
        let policy = RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
        };
        let attempts = AtomicU32::new(0);
        let result: Result<i32, _> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(AttemptOutcome::RateLimited {
                    retry_after: Some(Duration::from_millis(1)),
                })
            })
            .await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
