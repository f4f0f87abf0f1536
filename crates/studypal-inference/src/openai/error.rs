//! Mapping of chat completions failures onto studypal errors.

use studypal_core::Error;

/// Failure classes distinguished by status code and error `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Missing or rejected bearer token.
    Unauthorized,
    /// Too many requests or quota exhausted.
    RateLimited,
    /// The configured model does not exist on this endpoint.
    UnknownModel,
    /// Prompt plus expected output exceeds the context window.
    PromptTooLong,
    /// 5xx from the endpoint or a proxy in front of it.
    Unavailable,
    Other,
}

impl OpenAIErrorCode {
    pub fn from_response(status: u16, error_type: &str) -> Self {
        if error_type == "model_not_found" {
            return Self::UnknownModel;
        }
        match status {
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited,
            404 => Self::UnknownModel,
            400 | 413 if error_type.contains("context_length") => Self::PromptTooLong,
            500..=599 => Self::Unavailable,
            _ => Self::Other,
        }
    }

    /// Whether waiting and resending the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable)
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Unauthorized => "credentials rejected (check OPENAI_API_KEY)",
            Self::RateLimited => "rate limited",
            Self::UnknownModel => "model not available (check OPENAI_GEN_MODEL)",
            Self::PromptTooLong => "notes too long for the model context",
            Self::Unavailable => "endpoint unavailable",
            Self::Other => "request rejected",
        }
    }
}

/// Every endpoint failure surfaces as `Error::UpstreamFailure`.
pub fn to_studypal_error(code: OpenAIErrorCode, message: &str) -> Error {
    Error::UpstreamFailure(format!("Chat completions {}: {}", code.describe(), message))
}
