//! Response bodies and the error envelope.

use chrono::{SecondsFormat, Utc};
use http::StatusCode;
use serde::Serialize;

use mirror_commerce::search::API_VERSION;

/// Error codes reported in the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SearchError,
    FetchError,
    NotFound,
    BadRequest,
    RateLimited,
    MethodNotAllowed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SearchError => "SEARCH_ERROR",
            ErrorCode::FetchError => "FETCH_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::SearchError | ErrorCode::FetchError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// `{message, error, timestamp, path}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: &'static str,
    pub timestamp: String,
    /// Request URL including the query string.
    pub path: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: code.as_str(),
            timestamp: timestamp(),
            path: path.into(),
        }
    }
}

/// `{data, meta}` wrapper for product listings.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub timestamp: String,
    pub version: &'static str,
}

impl ResponseMeta {
    pub fn now() -> Self {
        Self {
            count: None,
            timestamp: timestamp(),
            version: API_VERSION,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// A rendered HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Serialize `value` as the body. Serialization failure becomes a bare 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                headers: Vec::new(),
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                Self::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, path: &str) -> Self {
        Self::json(code.status(), &ErrorBody::new(code, message, path))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Current time, RFC 3339 with milliseconds.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
