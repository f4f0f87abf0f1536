//! Gemini-specific error handling.

use studypal_core::Error;

/// Gemini error classes derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Malformed request or unsupported schema.
    InvalidArgument,
    /// Missing or rejected API key.
    PermissionDenied,
    /// Unknown model or endpoint.
    NotFound,
    /// Quota or rate limit exceeded.
    ResourceExhausted,
    /// Server-side failure.
    ServerError,
    /// Anything else.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and the `status` string of the body.
    pub fn from_response(status: u16, error_status: Option<&str>) -> Self {
        match (status, error_status) {
            (401 | 403, _) | (_, Some("PERMISSION_DENIED")) => Self::PermissionDenied,
            (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => Self::ResourceExhausted,
            (404, _) => Self::NotFound,
            (400, _) => Self::InvalidArgument,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted | Self::ServerError)
    }
}

/// Convert a Gemini error to a studypal `UpstreamFailure`.
pub fn to_studypal_error(code: GeminiErrorCode, status: u16, message: &str) -> Error {
    let label = match code {
        GeminiErrorCode::InvalidArgument => "Request rejected",
        GeminiErrorCode::PermissionDenied => "Authentication failed",
        GeminiErrorCode::NotFound => "Model not found",
        GeminiErrorCode::ResourceExhausted => "Rate limit exceeded",
        GeminiErrorCode::ServerError => "Server error",
        GeminiErrorCode::Unknown => "Unexpected response",
    };
    Error::UpstreamFailure(format!("Gemini returned {} ({}): {}", status, label, message))
}
