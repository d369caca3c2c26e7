use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Internal(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),
}

/// Failures surfaced by the remote API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API token is not configured")]
    MissingAuthToken,

    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("server returned status {status}")]
    Server { status: u16, body: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Whether a failed request may succeed if retried as-is.
///
/// A fatal failure means the server understood the request and rejected it;
/// replaying the same bytes will be rejected again. Everything else is
/// assumed to be a temporary server or network condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Fatal,
    Transient,
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn failure_class(&self) -> FailureClass {
        match self {
            ApiError::Server { status, .. } => classify_http_status(*status),
            _ => FailureClass::Transient,
        }
    }
}

/// Maps an HTTP status to a replay decision. 4xx responses are permanent
/// rejections; 5xx and anything unexpected is worth retrying later.
pub fn classify_http_status(status: u16) -> FailureClass {
    match status {
        400..=499 => FailureClass::Fatal,
        _ => FailureClass::Transient,
    }
}
