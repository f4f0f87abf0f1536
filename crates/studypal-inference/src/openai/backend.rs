//! Chat completions backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info, instrument, warn};

use studypal_core::{
    defaults, Error, GenerationBackend, GenerationOptions, GenerationOutput, Result,
};

use super::error::{to_studypal_error, OpenAIErrorCode};
use super::types::*;

/// Default chat completions endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Model used when `OPENAI_GEN_MODEL` is unset.
pub const DEFAULT_GEN_MODEL: &str = "gpt-4o-mini";

/// Per-request timeout when `OPENAI_TIMEOUT` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Name attached to `json_schema` response formats.
const SCHEMA_NAME: &str = "study_material";

/// Settings for a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Endpoint root, including the `/v1` segment.
    pub base_url: String,
    /// Bearer token. Local servers usually run without one.
    pub api_key: Option<String>,
    /// Chat model name as the endpoint knows it.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// Read `OPENAI_BASE_URL`, `OPENAI_API_KEY`, `OPENAI_GEN_MODEL` and
    /// `OPENAI_TIMEOUT`.
    pub fn from_env() -> Self {
        let fallback = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(fallback.base_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("OPENAI_GEN_MODEL").unwrap_or(fallback.model),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback.timeout_seconds),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "OPENAI_BASE_URL must be an http(s) URL, got: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("OPENAI_GEN_MODEL cannot be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config(
                "Generation timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backend for any server speaking the chat completions API.
///
/// There is no search tool on this API: grounded requests are answered from
/// the model alone and come back without citations.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %config.model,
            url = %config.base_url,
            authenticated = config.api_key.is_some(),
            "Chat completions backend ready"
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim().trim_end_matches('/'), path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn chat_request(&self, prompt: &str, options: &GenerationOptions) -> ChatCompletionRequest {
        let system = options
            .system
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| ChatMessage::new("system", s));
        let messages = system
            .into_iter()
            .chain(std::iter::once(ChatMessage::new("user", prompt)))
            .collect();

        let response_format = if let Some(schema) = &options.response_schema {
            Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaSpec {
                    name: SCHEMA_NAME.to_string(),
                    schema: to_json_schema(schema),
                },
            })
        } else if options.json_mode {
            Some(ResponseFormat::JsonObject)
        } else {
            None
        };

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: None,
            response_format,
            stream: false,
        }
    }

    async fn upstream_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<OpenAIErrorResponse>(&body) {
            Ok(parsed) => to_studypal_error(
                OpenAIErrorCode::from_response(status.as_u16(), &parsed.error.error_type),
                &format!("{} {}", status, parsed.error.message),
            ),
            Err(_) => to_studypal_error(
                OpenAIErrorCode::from_response(status.as_u16(), ""),
                &format!("{} {}", status, body.trim()),
            ),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    #[instrument(skip(self, prompt, options), fields(subsystem = "inference", component = "openai", op = "generate", model = %self.config.model, prompt_len = prompt.len(), json_mode = options.wants_json(), search = options.search))]
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        options.validate()?;
        let start = Instant::now();

        if options.search {
            debug!("Chat completions have no search tool; answering ungrounded");
        }

        let body = self.chat_request(prompt, options);
        let response = self
            .with_auth(self.client.post(self.url("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::UpstreamFailure(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamFailure(format!("Unreadable completion: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .find_map(|choice| Some(choice.message.content).filter(|c| !c.trim().is_empty()))
            .ok_or_else(|| Error::UpstreamFailure("Completion had no content".to_string()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(response_len = text.len(), duration_ms = elapsed, "Generation complete");
        if elapsed > defaults::SLOW_GENERATION_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow generation operation");
        }

        Ok(GenerationOutput::text(text))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self
            .with_auth(self.client.get(self.url("models")))
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        let healthy = match probe {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), "Model listing rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Endpoint unreachable");
                false
            }
        };
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> OpenAIBackend {
        OpenAIBackend::new(OpenAIConfig::default()).unwrap()
    }

    #[test]
    fn keyless_local_endpoint_is_accepted() {
        let config = OpenAIConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            model: "llama3".to_string(),
            ..Default::default()
        };
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.model_name(), "llama3");
        assert_eq!(backend.url("models"), "http://localhost:11434/v1/models");
    }

    #[test]
    fn schemeless_url_is_config_error() {
        let config = OpenAIConfig {
            base_url: "localhost:8080".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_timeout_is_config_error() {
        let config = OpenAIConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn plain_text_request_has_no_format() {
        let request = backend().chat_request("Hi", &GenerationOptions::text());
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert!(request.response_format.is_none());
    }

    #[test]
    fn json_mode_adds_system_message_and_object_format() {
        let options = GenerationOptions::json().with_system("Return JSON.");
        let request = backend().chat_request("Hi", &options);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "Hi");
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
    }

    #[test]
    fn blank_system_prompt_is_dropped() {
        let options = GenerationOptions::text().with_system("  ");
        let request = backend().chat_request("Hi", &options);
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn schema_becomes_lowercase_json_schema() {
        let options =
            GenerationOptions::structured(json!({"type": "ARRAY", "items": {"type": "STRING"}}));
        match backend().chat_request("Hi", &options).response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, SCHEMA_NAME);
                assert_eq!(json_schema.schema["type"], "array");
                assert_eq!(json_schema.schema["items"]["type"], "string");
            }
            other => panic!("expected json_schema format, got {:?}", other),
        }
    }
}
