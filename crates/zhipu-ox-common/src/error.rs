use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to the provider over HTTP
#[derive(Error, Debug)]
pub enum CommonRequestError {
    /// HTTP request failed at the transport level (DNS, timeout, reset)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or(.body.as_str()))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        /// Raw response body, kept verbatim for reporting
        body: String,
    },

    /// A success status whose body did not match the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Too many consecutive undecodable frames in an event stream
    #[error("Aborted stream after {0} consecutive malformed frames")]
    TooManyMalformedFrames(usize),

    /// Authentication is missing (no API key configured)
    #[error("Authentication missing: no API key provided")]
    AuthenticationMissing,
}

impl CommonRequestError {
    /// HTTP status for API errors, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error was raised before any request left the process
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::AuthenticationMissing)
    }
}

/// `{"error": {"code": "1214", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default, deserialize_with = "code_as_string")]
    code: Option<String>,
    message: Option<String>,
}

/// Codes arrive either as strings or as bare numbers
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Parse an error response from HTTP status and body
pub fn parse_error_response(status: reqwest::StatusCode, body: &bytes::Bytes) -> CommonRequestError {
    let raw = String::from_utf8_lossy(body).into_owned();

    match serde_json::from_slice::<ApiErrorPayload>(body) {
        Ok(payload) => CommonRequestError::Api {
            status: status.as_u16(),
            code: payload.error.code,
            message: payload.error.message,
            body: raw,
        },
        Err(_) => CommonRequestError::Api {
            status: status.as_u16(),
            code: None,
            message: None,
            body: raw,
        },
    }
}
