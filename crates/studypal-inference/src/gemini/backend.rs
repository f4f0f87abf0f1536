//! Gemini generation backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use studypal_core::{
    defaults, Error, GenerationBackend, GenerationOptions, GenerationOutput, Result,
};

use super::error::{to_studypal_error, GeminiErrorCode};
use super::types::*;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL for the REST API (up to and including the version segment).
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            model: defaults::GEN_MODEL.to_string(),
            timeout_seconds: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Read configuration from the environment.
    ///
    /// The key is taken from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| defaults::GEMINI_URL.to_string()),
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| defaults::GEN_MODEL.to_string()),
            timeout_seconds: std::env::var("STUDYPAL_GEN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Gemini base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("Gemini model cannot be empty".to_string()));
        }
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(Error::Config(
                "Gemini API key missing: set GEMINI_API_KEY".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config(
                "Generation timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            model = %config.model,
            "Initializing Gemini backend: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn build_request_body(prompt: &str, options: &GenerationOptions) -> GenerateContentRequest {
        let generation_config = if options.wants_json() {
            Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: options.response_schema.clone(),
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: options
                .system
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Content::system),
            generation_config,
            tools: if options.search {
                vec![Tool::google_search()]
            } else {
                Vec::new()
            },
        }
    }

    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<GeminiErrorResponse>(&body) {
            Ok(parsed) => {
                let code = GeminiErrorCode::from_response(status, parsed.error.status.as_deref());
                to_studypal_error(code, status, &parsed.error.message)
            }
            Err(_) => to_studypal_error(GeminiErrorCode::from_response(status, None), status, &body),
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(skip(self, prompt, options), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.config.model, prompt_len = prompt.len(), json_mode = options.wants_json(), search = options.search))]
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        options.validate()?;
        let start = Instant::now();

        debug!(
            has_schema = options.response_schema.is_some(),
            "Starting generateContent call"
        );

        let request = Self::build_request_body(prompt, options);
        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header(API_KEY_HEADER, self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::UpstreamFailure(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            warn!(error = %err, "Gemini request failed");
            return Err(err);
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamFailure(format!("Failed to parse response: {}", e)))?;

        let Some(candidate) = result.candidates.into_iter().next() else {
            let reason = result
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(Error::UpstreamFailure(format!(
                "Gemini returned no content: {}",
                reason
            )));
        };

        let text = candidate
            .content
            .as_ref()
            .map(Content::joined_text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "empty candidate".to_string());
            return Err(Error::UpstreamFailure(format!(
                "Gemini returned an empty response: {}",
                reason
            )));
        }

        let citations = candidate
            .grounding_metadata
            .as_ref()
            .map(GroundingMetadata::citations)
            .unwrap_or_default();

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            citation_count = citations.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > defaults::SLOW_GENERATION_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }

        Ok(GenerationOutput { text, citations })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.model_url())
            .header(API_KEY_HEADER, self.api_key())
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Gemini health check passed");
                    Ok(true)
                } else {
                    warn!("Gemini health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Gemini health check error: {}", e);
                Ok(false)
            }
        }
    }
}
