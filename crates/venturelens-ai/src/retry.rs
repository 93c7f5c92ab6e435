use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use venturelens_core::RetryConfig;

/// Why a single request attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Connection refused, DNS, timeout
    Transport,
    /// HTTP 5xx
    ServerError,
    /// HTTP 429
    RateLimited,
    /// Any other non-success status
    ClientError,
    /// The body could not be decoded
    Decode,
}

impl FailureClass {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            FailureClass::RateLimited
        } else if status.is_server_error() {
            FailureClass::ServerError
        } else {
            FailureClass::ClientError
        }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            FailureClass::Decode
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else {
            FailureClass::Transport
        }
    }
}

/// A failed attempt together with its classification
#[derive(Debug)]
pub struct AttemptError {
    pub class: FailureClass,
    pub error: anyhow::Error,
}

impl AttemptError {
    pub fn new(class: FailureClass, error: anyhow::Error) -> Self {
        Self { class, error }
    }
}

/// Retry parameters for a provider client
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
    pub retry_on_transport: bool,
    pub retry_on_server_error: bool,
    pub retry_on_rate_limit: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retry_on_transport: config.retry_on_transport,
            retry_on_server_error: config.retry_on_server_error,
            retry_on_rate_limit: config.retry_on_rate_limit,
        }
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn is_retryable(&self, class: FailureClass) -> bool {
        match class {
            FailureClass::Transport => self.retry_on_transport,
            FailureClass::ServerError => self.retry_on_server_error,
            FailureClass::RateLimited => self.retry_on_rate_limit,
            FailureClass::ClientError | FailureClass::Decode => false,
        }
    }

    /// Delay to wait before `attempt` (1-based). The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = self.backoff_multiplier.powi(attempt as i32 - 2);
        let millis = (self.initial_backoff.as_millis() as f64 * factor)
            .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    /// Run `op` until it succeeds, fails with a non-retryable class, or attempts run out.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, AttemptError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let mut attempt = 1;
        loop {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !self.is_retryable(err.class) {
                        return Err(err);
                    }
                    tracing::warn!(
                        "{} request failed (attempt {}/{}, {:?}), retrying...",
                        label,
                        attempt,
                        self.max_attempts,
                        err.class
                    );
                    attempt += 1;
                }
            }
        }
    }
}
