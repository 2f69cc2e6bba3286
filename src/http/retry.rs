//! Status classification for retried downloads.
//!
//! Tarball hosts answer 4xx for requests that will never succeed (missing
//! version, private package); those are surfaced immediately. 5xx and
//! transport errors are retried.

use reqwest::StatusCode;

/// Maximum number of attempts for a download.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// HTTP 429
    RateLimitExceeded(String),
    /// HTTP 401
    AuthenticationFailed(String),
    /// HTTP 404
    NotFound(String),
    /// HTTP 403
    Forbidden(String),
    /// Any other 4xx
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(msg) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", msg)
            }
            NonRetryableError::AuthenticationFailed(msg) => {
                write!(
                    f,
                    "Authentication failed: {}. The registry requires credentials.",
                    msg
                )
            }
            NonRetryableError::NotFound(msg) => write!(f, "Not found: {}", msg),
            NonRetryableError::Forbidden(msg) => write!(f, "Access forbidden: {}", msg),
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Maps a status code to a non-retryable error, or `None` when retrying may help.
pub fn classify_status(status: StatusCode) -> Option<NonRetryableError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(NonRetryableError::AuthenticationFailed(
            "registry rejected the request".to_string(),
        )),
        StatusCode::FORBIDDEN => Some(NonRetryableError::Forbidden(
            "the package is not accessible".to_string(),
        )),
        StatusCode::TOO_MANY_REQUESTS => Some(NonRetryableError::RateLimitExceeded(
            "too many requests".to_string(),
        )),
        StatusCode::NOT_FOUND => Some(NonRetryableError::NotFound(
            "the requested tarball does not exist".to_string(),
        )),
        s if s.is_client_error() => Some(NonRetryableError::ClientError(format!(
            "HTTP {} error",
            s.as_u16()
        ))),
        _ => None,
    }
}

/// Classifies a reqwest error. `Ok(())` means the error is retryable.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    match error.status().and_then(classify_status) {
        Some(non_retryable) => Err(non_retryable),
        None => Ok(()),
    }
}

/// Converts an `error_for_status()` failure into an `anyhow::Error`,
/// swapping in a [`NonRetryableError`] when retrying cannot help.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
