//! Resilient HTTP fetch layer.
//!
//! Every request runs through a bounded retry loop: HTTP 429 honors a numeric
//! `Retry-After` without advancing the backoff schedule, every other failure
//! (transport, timeout, status >= 400, undecodable body) backs off
//! exponentially with jitter. Exhausting the attempts yields an error wrapping
//! the last observed cause; there are no sentinel values.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failures that can occur while fetching a remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building the shared HTTP client failed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying client construction error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("request to `{url}` failed")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an error status.
    #[error("HTTP {status} from `{url}`: {body}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code of the response.
        status: StatusCode,
        /// Response body, for operator-visible diagnostics.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("failed to decode response from `{url}`")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// A decoded payload did not match the expected shape.
    #[error("unexpected payload shape from `{url}`")]
    Shape {
        /// Requested URL.
        url: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
    /// Every attempt failed; carries the last observed cause.
    #[error("request to `{url}` failed after {attempts} attempts")]
    RetriesExhausted {
        /// Requested URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Failure observed on the final attempt.
        #[source]
        source: Box<FetchError>,
    },
}

/// Per-request knobs for the retry schedule.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total timeout applied to each individual attempt.
    pub timeout: Duration,
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,
    /// Base delay of the exponential backoff schedule.
    pub base_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Upper bound on the random jitter added to each backoff delay.
const JITTER_MAX: Duration = Duration::from_millis(500);

/// User agent sent with every provider request.
const USER_AGENT: &str = "Mozilla/5.0 (ping-board status checker)";

/// HTTP fetcher sharing one connection pool across every logical caller.
///
/// Cloning is cheap and clones share the pool, so the poller and
/// user-triggered actions can fetch concurrently. Dropping the returned
/// future aborts the in-flight request; cancellation is never absorbed by
/// the retry loop.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

/// A single failed attempt, split so the retry loop can tell rate limiting
/// apart from ordinary failures.
enum AttemptFailure {
    /// HTTP 429 with the parsed `Retry-After` value, when present and sane.
    RateLimited {
        retry_after: Option<Duration>,
        cause: FetchError,
    },
    /// Any other retryable failure.
    Failed(FetchError),
}

impl AttemptFailure {
    fn into_cause(self) -> FetchError {
        match self {
            AttemptFailure::RateLimited { cause, .. } | AttemptFailure::Failed(cause) => cause,
        }
    }
}

impl Fetcher {
    /// Build a fetcher with its own connection pool.
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::ClientBuilder { source })?;
        Ok(Self { client })
    }

    /// Fetch a URL and decode its body as JSON into `T`.
    pub async fn get_json<T>(&self, url: &str, options: &FetchOptions) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        let value = self
            .retry(url, options, |response, url| {
                Box::pin(async move {
                    response
                        .json::<serde_json::Value>()
                        .await
                        .map_err(|source| FetchError::Decode { url, source })
                })
            })
            .await?;
        serde_json::from_value(value).map_err(|source| FetchError::Shape {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch a URL and return its body as text.
    pub async fn get_text(&self, url: &str, options: &FetchOptions) -> FetchResult<String> {
        self.retry(url, options, |response, url| {
            Box::pin(async move {
                response
                    .text()
                    .await
                    .map_err(|source| FetchError::Decode { url, source })
            })
        })
        .await
    }

    /// Run the bounded retry loop around one decoded GET.
    async fn retry<T, D>(&self, url: &str, options: &FetchOptions, decode: D) -> FetchResult<T>
    where
        D: Fn(Response, String) -> BoxFuture<'static, FetchResult<T>>,
    {
        let max_attempts = options.max_attempts.max(1);
        let mut backoff_step = 0u32;

        for attempt in 1..=max_attempts {
            let failure = match self.attempt(url, options.timeout, &decode).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            if attempt == max_attempts {
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: max_attempts,
                    source: Box::new(failure.into_cause()),
                });
            }

            // Retry-After is honored verbatim and does not advance the
            // backoff schedule; everything else backs off exponentially.
            let delay = match &failure {
                AttemptFailure::RateLimited {
                    retry_after: Some(wait),
                    ..
                } => *wait,
                _ => {
                    let delay = backoff_delay(options.base_delay, backoff_step);
                    backoff_step += 1;
                    delay
                }
            };

            warn!(
                url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure.into_cause(),
                "fetch attempt failed; retrying"
            );
            sleep(delay).await;
        }

        unreachable!("retry loop always returns on the final attempt")
    }

    async fn attempt<T, D>(
        &self,
        url: &str,
        timeout: Duration,
        decode: &D,
    ) -> Result<T, AttemptFailure>
    where
        D: Fn(Response, String) -> BoxFuture<'static, FetchResult<T>>,
    {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| {
                AttemptFailure::Failed(FetchError::Transport {
                    url: url.to_string(),
                    source,
                })
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::RateLimited {
                retry_after,
                cause: FetchError::Status {
                    url: url.to_string(),
                    status,
                    body,
                },
            });
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Failed(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            }));
        }

        decode(response, url.to_string())
            .await
            .map_err(AttemptFailure::Failed)
    }
}

/// Parse a numeric `Retry-After` header as seconds.
fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Exponential backoff with uniform jitter: `base * 2^step + U(0, 500ms)`.
fn backoff_delay(base: Duration, step: u32) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(step));
    exponential + JITTER_MAX.mul_f64(rand::random::<f64>())
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde::Deserialize;
    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        ok: bool,
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn fast_options(max_attempts: u32) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(5),
            max_attempts,
            base_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn first_attempt_success_does_not_retry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/payload",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(serde_json::json!({"ok": true})) }
            }),
        );
        let addr = serve(router).await;

        let fetcher = Fetcher::new().unwrap();
        let payload: Payload = fetcher
            .get_json(&format!("http://{addr}/payload"), &fast_options(3))
            .await
            .unwrap();

        assert!(payload.ok);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_server_error_is_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/flaky",
            get(move || {
                let hit = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if hit == 0 {
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
                    } else {
                        Json(serde_json::json!({"ok": true})).into_response()
                    }
                }
            }),
        );
        let addr = serve(router).await;

        let fetcher = Fetcher::new().unwrap();
        let payload: Payload = fetcher
            .get_json(&format!("http://{addr}/flaky"), &fast_options(3))
            .await
            .unwrap();

        assert!(payload.ok);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rate_limit_waits_at_least_retry_after() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/limited",
            get(move || {
                let hit = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if hit == 0 {
                        let mut headers = HeaderMap::new();
                        headers.insert(header::RETRY_AFTER, "1".parse().unwrap());
                        (StatusCode::TOO_MANY_REQUESTS, headers, "slow down").into_response()
                    } else {
                        Json(serde_json::json!({"ok": true})).into_response()
                    }
                }
            }),
        );
        let addr = serve(router).await;

        let fetcher = Fetcher::new().unwrap();
        let started = Instant::now();
        let payload: Payload = fetcher
            .get_json(&format!("http://{addr}/limited"), &fast_options(3))
            .await
            .unwrap();

        assert!(payload.ok);
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_carry_the_last_cause() {
        let router = Router::new().route(
            "/down",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let addr = serve(router).await;

        let fetcher = Fetcher::new().unwrap();
        let err = fetcher
            .get_json::<Payload>(&format!("http://{addr}/down"), &fast_options(2))
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted {
                attempts, source, ..
            } => {
                assert_eq!(attempts, 2);
                assert!(matches!(
                    *source,
                    FetchError::Status {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        ..
                    }
                ));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_retried_then_reported() {
        let router = Router::new().route("/garbage", get(|| async { "{not json" }));
        let addr = serve(router).await;

        let fetcher = Fetcher::new().unwrap();
        let err = fetcher
            .get_json::<Payload>(&format!("http://{addr}/garbage"), &fast_options(2))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RetriesExhausted { .. }));
    }
}
