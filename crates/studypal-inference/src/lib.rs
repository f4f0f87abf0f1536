//! # studypal-inference
//!
//! Generation backends for studypal.
//!
//! This crate provides:
//! - Gemini implementation with structured output and search grounding (default)
//! - OpenAI-compatible implementation (optional, feature `openai`)
//! - Scripted mock backend for tests (feature `mock`)
//! - Environment-driven backend selection
//!
//! # Feature Flags
//!
//! - `gemini` (default): Enable Gemini backend
//! - `openai`: Enable OpenAI-compatible backend
//! - `mock`: Expose [`mock::MockGenerationBackend`] to dependent crates

pub mod config;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use studypal_core::*;

pub use config::{BackendKind, InferenceConfig};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockGenerationBackend, MockReply};
