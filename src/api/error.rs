use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the broker or the messaging API
///
/// These never reach the engine: the candle source turns them into an empty
/// row list and the notifier logs and drops them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

impl ApiError {
    /// Rate limits and server errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            ApiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::Rejected { .. } => false,
        }
    }
}
