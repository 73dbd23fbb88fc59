use crate::utils::error::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "etl-connector/1.0";
pub const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// When and how long to wait before re-sending a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub retry_statuses: Vec<StatusCode>,
    pub retry_methods: Vec<Method>,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 1.5,
            backoff_max: Duration::from_secs(120),
            retry_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
            retry_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ],
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never re-sends.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn allows_method(&self, method: &Method) -> bool {
        self.retry_methods.contains(method)
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    pub fn has_attempts_left(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Sleep after `consecutive_failures` failed attempts: none after the first,
    /// then `factor * 2^(n-1)` seconds, capped at `backoff_max`.
    pub fn backoff_for(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures <= 1 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_failures - 1).min(31) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent);
        if !seconds.is_finite() || seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(seconds).min(self.backoff_max)
    }

    /// Delay before the next attempt, honouring a server `Retry-After` for 429/503.
    pub fn delay_for(&self, consecutive_failures: u32, response: Option<&Response>) -> Duration {
        let server_hint = response
            .filter(|_| self.respect_retry_after)
            .filter(|r| {
                matches!(
                    r.status(),
                    StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
                )
            })
            .and_then(|r| parse_retry_after(r.headers()));

        match server_hint {
            Some(hint) => hint.min(self.backoff_max),
            None => self.backoff_for(consecutive_failures),
        }
    }
}

/// Only the delta-seconds form of `Retry-After` is understood.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Shared HTTP client: pooled connections, JSON default headers and
/// transparent retries. Callers only ever see the final response.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let inner = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()?;

        Ok(Self { inner, policy })
    }

    pub fn get(&self, url: url::Url) -> RequestBuilder {
        self.inner.get(url)
    }

    /// Sends the request, re-sending on retryable statuses and transport
    /// errors while the policy allows. An exhausted budget returns the last
    /// response as-is.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let retryable_method = self.policy.allows_method(request.method());
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            // body 為串流時無法複製，只能送一次
            let attempt = match request.try_clone() {
                Some(attempt) => attempt,
                None => return Ok(self.inner.execute(request).await?),
            };

            let can_retry = retryable_method && self.policy.has_attempts_left(attempts);

            match self.inner.execute(attempt).await {
                Ok(response) => {
                    if !(can_retry && self.policy.is_retryable_status(response.status())) {
                        return Ok(response);
                    }

                    let delay = self.policy.delay_for(attempts, Some(&response));
                    tracing::warn!(
                        "Retrying {} {} after status {} (attempt {}/{}, waiting {:?})",
                        request.method(),
                        request.url(),
                        response.status().as_u16(),
                        attempts,
                        self.policy.max_attempts,
                        delay
                    );
                    drop(response);
                    tokio::time::sleep(delay).await;
                }
                Err(error) if can_retry && is_transient(&error) => {
                    let delay = self.policy.delay_for(attempts, None);
                    tracing::warn!(
                        "Retrying {} {} after transport error: {} (attempt {}/{}, waiting {:?})",
                        request.method(),
                        request.url(),
                        error,
                        attempts,
                        self.policy.max_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}
