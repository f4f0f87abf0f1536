//! Error types for studypal.

use thiserror::Error;

/// Result type alias using studypal's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of raw response characters echoed in log lines.
const RAW_PREVIEW_CHARS: usize = 200;

/// Core error type for studypal operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied an argument outside the operation's contract
    /// (zero chunk limit, conflicting generation options, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Model output could not be coerced into the expected structured shape.
    ///
    /// `raw` keeps the untouched model text for diagnostics.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, raw: String },

    /// The generation service call itself failed (network, non-2xx, blocked).
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `MalformedResponse` carrying the raw model text.
    pub fn malformed(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Raw model text attached to a `MalformedResponse`, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Short prefix of the raw model text, for log fields.
    pub fn raw_preview(&self) -> Option<String> {
        self.raw_response()
            .map(|raw| raw.chars().take(RAW_PREVIEW_CHARS).collect())
    }

    /// Whether the error came from the generation service or its output,
    /// as opposed to a caller or local environment problem.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Error::MalformedResponse { .. } | Error::UpstreamFailure(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::UpstreamFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let err = Error::InvalidArgument("limit must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: limit must be positive");
    }

    #[test]
    fn test_error_display_malformed_response() {
        let err = Error::malformed("no JSON value found", "I could not find any questions.");
        assert_eq!(err.to_string(), "Malformed response: no JSON value found");
    }

    #[test]
    fn test_malformed_response_keeps_raw_text() {
        let err = Error::malformed("bad", "raw model text");
        assert_eq!(err.raw_response(), Some("raw model text"));
    }

    #[test]
    fn test_raw_preview_truncates() {
        let raw = "x".repeat(1000);
        let err = Error::malformed("bad", raw);
        assert_eq!(err.raw_preview().unwrap().len(), RAW_PREVIEW_CHARS);
    }

    #[test]
    fn test_raw_response_absent_for_other_variants() {
        let err = Error::UpstreamFailure("503".to_string());
        assert!(err.raw_response().is_none());
        assert!(err.raw_preview().is_none());
    }

    #[test]
    fn test_error_display_upstream_failure() {
        let err = Error::UpstreamFailure("Gemini returned 503".to_string());
        assert_eq!(err.to_string(), "Upstream failure: Gemini returned 503");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("note 42".to_string());
        assert_eq!(err.to_string(), "Not found: note 42");
    }

    #[test]
    fn test_is_generation_failure() {
        assert!(Error::malformed("x", "y").is_generation_failure());
        assert!(Error::UpstreamFailure("x".to_string()).is_generation_failure());
        assert!(!Error::InvalidArgument("x".to_string()).is_generation_failure());
        assert!(!Error::Config("x".to_string()).is_generation_failure());
    }

    #[test]
    fn test_io_error_converts_and_displays() {
        let err: Error =
            std::io::Error::new(std::io::ErrorKind::NotFound, "notes.pdf missing").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: notes.pdf missing");
    }

    #[test]
    fn test_library_json_error_is_serialization() {
        let err: Error = serde_json::from_str::<Vec<String>>("{not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(ref m) if !m.is_empty()));
        assert!(!err.is_generation_failure());
    }

    #[test]
    fn test_error_crosses_task_boundaries() {
        fn shareable<T: Send + Sync + 'static>() {}
        shareable::<Error>();
    }
}
