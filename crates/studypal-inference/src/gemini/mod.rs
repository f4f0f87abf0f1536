//! Gemini generation backend.
//!
//! Talks to the Gemini REST API (`models/{model}:generateContent`) with
//! optional structured output (`responseMimeType` + `responseSchema`) and
//! optional Google Search grounding. Grounding sources come back as
//! [`GroundingCitation`](studypal_core::GroundingCitation)s.
//!
//! # Example
//!
//! ```rust,no_run
//! use studypal_inference::gemini::{GeminiBackend, GeminiConfig};
//! use studypal_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::new(GeminiConfig {
//!         api_key: Some("your-key".to_string()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!     let summary = backend.generate("Summarize: ...").await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use error::{to_studypal_error, GeminiErrorCode};
pub use types::*;
