//! Core traits for studypal collaborators.
//!
//! These traits define the seams to the outside world (the generation
//! service, file-to-text extraction and persistence) so concrete adapters
//! can be swapped and tests can run without network access.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::GroundingCitation;

// =============================================================================
// GENERATION TRAITS
// =============================================================================

/// Per-call options for a generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// System instruction prepended to the conversation.
    pub system: Option<String>,
    /// Structured-output schema the response must follow.
    pub response_schema: Option<JsonValue>,
    /// Ask for a JSON response without a schema.
    pub json_mode: bool,
    /// Enable web-search grounding.
    pub search: bool,
}

impl GenerationOptions {
    /// Plain free-text generation.
    pub fn text() -> Self {
        Self::default()
    }

    /// JSON output with no schema.
    pub fn json() -> Self {
        Self {
            json_mode: true,
            ..Self::default()
        }
    }

    /// JSON output constrained by a response schema.
    pub fn structured(schema: JsonValue) -> Self {
        Self {
            response_schema: Some(schema),
            json_mode: true,
            ..Self::default()
        }
    }

    /// Free-text output with web-search grounding.
    pub fn grounded() -> Self {
        Self {
            search: true,
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Whether structured output of any form was requested.
    pub fn wants_json(&self) -> bool {
        self.json_mode || self.response_schema.is_some()
    }

    /// Structured output and search grounding cannot be combined.
    pub fn validate(&self) -> Result<()> {
        if self.search && self.wants_json() {
            return Err(Error::InvalidArgument(
                "search grounding cannot be combined with structured output".to_string(),
            ));
        }
        Ok(())
    }
}

/// Text returned by a generation call plus any grounding sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub text: String,
    pub citations: Vec<GroundingCitation>,
}

impl GenerationOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// Backend for text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a response with explicit options.
    ///
    /// Implementations must call [`GenerationOptions::validate`] before any
    /// network I/O.
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput>;

    /// Generate free text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self
            .generate_with_options(prompt, &GenerationOptions::text())
            .await?
            .text)
    }

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let options = GenerationOptions::text().with_system(system);
        Ok(self.generate_with_options(prompt, &options).await?.text)
    }

    /// Generate JSON text, optionally constrained by a response schema.
    async fn generate_json(&self, prompt: &str, schema: Option<JsonValue>) -> Result<String> {
        let options = match schema {
            Some(schema) => GenerationOptions::structured(schema),
            None => GenerationOptions::json(),
        };
        Ok(self.generate_with_options(prompt, &options).await?.text)
    }

    /// Generate free text with web-search grounding.
    async fn generate_grounded(&self, prompt: &str) -> Result<GenerationOutput> {
        self.generate_with_options(prompt, &GenerationOptions::grounded())
            .await
    }

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool>;
}

// =============================================================================
// INGESTION TRAITS
// =============================================================================

/// Converts an uploaded file into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from file bytes; `filename` is used for diagnostics.
    async fn extract(&self, data: &[u8], filename: &str) -> Result<String>;

    /// Short adapter name for logs.
    fn name(&self) -> &str;
}

// =============================================================================
// PERSISTENCE TRAITS
// =============================================================================

/// String key-value persistence for the saved library.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
