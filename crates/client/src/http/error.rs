//! HTTP error taxonomy.

use thiserror::Error;

/// Failure at any stage of the request pipeline.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection-level failure (DNS, refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a status outside `[200, 300)`.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An interceptor refused to let the request proceed.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be built from the caller's input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local I/O failed (reading an upload file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// HTTP status, when the failure came from the server.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// The normalised error returned to callers: a user-facing `message` and the
/// underlying `cause`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    #[source]
    pub cause: HttpError,
}

impl ClientError {
    #[must_use]
    pub fn new(message: impl Into<String>, cause: HttpError) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// HTTP status of the underlying failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.cause.status()
    }
}

impl From<HttpError> for ClientError {
    fn from(cause: HttpError) -> Self {
        Self {
            message: cause.to_string(),
            cause,
        }
    }
}
