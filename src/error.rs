use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum InterviewApiError {
    /// Transport-level failure before or during a request.
    Request(reqwest::Error),
    /// Non-2xx response received before any events were yielded.
    Status(StatusCode, String),
    /// 2xx response with no readable body to stream from.
    StreamUnavailable,
    Serde(JsonError),
    InvalidHeader(String),
}

/// Error body shape the agent service emits on failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<String>,
}

impl fmt::Display for InterviewApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::StreamUnavailable => write!(f, "response stream unavailable"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
        }
    }
}

impl std::error::Error for InterviewApiError {}

impl From<reqwest::Error> for InterviewApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for InterviewApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Best-effort error message extraction from a failure response body.
///
/// Prefers the JSON `detail` field, then the raw body text, then a generic
/// `(status)` marker when the body is empty.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(detail) = payload.detail {
            let detail = detail.trim();
            if !detail.is_empty() {
                return detail.to_string();
            }
        }
    }

    if body.trim().is_empty() {
        format!("({})", status.as_u16())
    } else {
        body.to_string()
    }
}
