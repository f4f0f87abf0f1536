//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the chat completions API (OpenAI,
//! OpenRouter, vLLM, LM Studio, Ollama in compatibility mode). Structured
//! output maps onto `response_format`; response schemas written in the
//! Gemini dialect are converted to plain JSON Schema.
//!
//! # Example
//!
//! ```rust,no_run
//! use studypal_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use studypal_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let reply = backend.generate("Explain inertia briefly.").await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{to_studypal_error, OpenAIErrorCode};
pub use types::*;
