//! Backend selection and construction.
//!
//! The backend is chosen with `STUDYPAL_BACKEND` (`gemini` by default) and
//! each backend reads its own environment variables.
//!
//! # Example
//!
//! ```rust,no_run
//! use studypal_inference::config::InferenceConfig;
//!
//! let config = InferenceConfig::from_env().expect("invalid backend");
//! config.validate().expect("invalid configuration");
//! let backend = config.build_backend().expect("backend");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use studypal_core::{Error, GenerationBackend, Result};

#[cfg(feature = "gemini")]
use crate::gemini::{GeminiBackend, GeminiConfig};
#[cfg(feature = "openai")]
use crate::openai::{OpenAIBackend, OpenAIConfig};

/// Generation backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Gemini,
    OpenAI,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            _ => Err(Error::Config(format!("Invalid backend: {}", s))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

/// Configuration for every compiled-in backend plus the selected one.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    pub backend: BackendKind,
    #[cfg(feature = "gemini")]
    pub gemini: GeminiConfig,
    #[cfg(feature = "openai")]
    pub openai: OpenAIConfig,
}

impl InferenceConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("STUDYPAL_BACKEND") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => BackendKind::default(),
        };
        debug!(backend = %backend, "Loaded inference configuration from environment");

        Ok(Self {
            backend,
            #[cfg(feature = "gemini")]
            gemini: GeminiConfig::from_env(),
            #[cfg(feature = "openai")]
            openai: OpenAIConfig::from_env(),
        })
    }

    /// Validate the selected backend's configuration.
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            #[cfg(feature = "gemini")]
            BackendKind::Gemini => self.gemini.validate(),
            #[cfg(feature = "openai")]
            BackendKind::OpenAI => self.openai.validate(),
            #[allow(unreachable_patterns)]
            other => Err(Error::Config(format!(
                "Backend '{}' is not compiled in; enable the '{}' feature",
                other, other
            ))),
        }
    }

    /// Construct the selected backend.
    pub fn build_backend(&self) -> Result<Arc<dyn GenerationBackend>> {
        info!(backend = %self.backend, "Building generation backend");
        match self.backend {
            #[cfg(feature = "gemini")]
            BackendKind::Gemini => Ok(Arc::new(GeminiBackend::new(self.gemini.clone())?)),
            #[cfg(feature = "openai")]
            BackendKind::OpenAI => Ok(Arc::new(OpenAIBackend::new(self.openai.clone())?)),
            #[allow(unreachable_patterns)]
            other => Err(Error::Config(format!(
                "Backend '{}' is not compiled in; enable the '{}' feature",
                other, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert_eq!("GOOGLE".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert_eq!("OpenAI".parse::<BackendKind>().unwrap(), BackendKind::OpenAI);
        assert!(matches!(
            "claude".parse::<BackendKind>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_backend_kind_display_round_trip() {
        for kind in [BackendKind::Gemini, BackendKind::OpenAI] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_backend_is_gemini() {
        assert_eq!(InferenceConfig::default().backend, BackendKind::Gemini);
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_gemini_without_key_fails_to_build() {
        let config = InferenceConfig::default();
        assert!(matches!(config.build_backend(), Err(Error::Config(_))));
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_gemini_with_key_builds() {
        let mut config = InferenceConfig::default();
        config.gemini.api_key = Some("test-key".to_string());
        let backend = config.build_backend().unwrap();
        assert_eq!(backend.model_name(), studypal_core::defaults::GEN_MODEL);
    }

    #[cfg(not(feature = "openai"))]
    #[test]
    fn test_openai_without_feature_is_config_error() {
        let config = InferenceConfig {
            backend: BackendKind::OpenAI,
            ..Default::default()
        };
        assert!(matches!(config.build_backend(), Err(Error::Config(_))));
    }
}
