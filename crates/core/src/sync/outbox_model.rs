use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ApiError, Error, Result};

/// HTTP verbs a queued operation can carry. GETs are never queued; reads
/// fall back to local data instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn parse(raw: &str) -> Option<HttpMethod> {
        match raw {
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued write: enough to re-issue the original request verbatim.
///
/// Ids are UUIDv7 so they sort in creation order; the timestamp is what
/// replay and reconstruction actually order by.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: HttpMethod,
    pub path: String,
    pub payload: Option<String>,
}

impl PendingOperation {
    pub fn new(method: HttpMethod, path: impl Into<String>, payload: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            method,
            path: path.into(),
            payload,
        }
    }

    /// Whether this operation targets the given endpoint family.
    pub fn concerns(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }

    /// The numeric id at the end of the path, if any. Provisional negative
    /// ids parse too.
    pub fn trailing_id(&self) -> Option<i64> {
        self.path.rsplit('/').next().and_then(|s| s.parse().ok())
    }
}

/// Encodes a request body for queueing. Failure here is an encoding error
/// surfaced to the caller, not something to queue.
pub fn encode_payload<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| Error::Api(ApiError::Encoding(err)))
}
