//! Scripted generation backend for deterministic testing.
//!
//! Replies are chosen by prompt substring: the first rule whose pattern
//! occurs in the prompt wins, otherwise the default reply is returned.
//! Every call is recorded so tests can assert on prompts and options.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use studypal_inference::mock::MockGenerationBackend;
//! use studypal_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockGenerationBackend::new()
//!         .with_default_response("Default reply")
//!         .with_failure_on("BRAVO", "simulated outage");
//!
//!     assert_eq!(backend.generate("ALPHA").await.unwrap(), "Default reply");
//!     assert!(backend.generate("BRAVO").await.is_err());
//!     assert_eq!(backend.call_count(), 2);
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use studypal_core::{
    Error, GenerationBackend, GenerationOptions, GenerationOutput, GroundingCitation, Result,
};

/// Scripted reply for a matching prompt.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Return text plus grounding citations.
    Grounded {
        text: String,
        citations: Vec<GroundingCitation>,
    },
    /// Fail with `UpstreamFailure`.
    Failure(String),
}

#[derive(Debug, Clone)]
struct MockRule {
    pattern: String,
    reply: MockReply,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    rules: Vec<MockRule>,
    default_reply: MockReply,
    latency_ms: u64,
    healthy: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-model".to_string(),
            rules: Vec::new(),
            default_reply: MockReply::Text("Mock response".to_string()),
            latency_ms: 0,
            healthy: true,
        }
    }
}

/// One recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub options: GenerationOptions,
    pub timestamp: std::time::Instant,
}

/// Mock generation backend for testing.
#[derive(Clone, Default)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reply used when no rule matches.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_reply = MockReply::Text(response.into());
        self
    }

    /// Reply with `response` when the prompt contains `pattern`.
    pub fn with_response_on(
        self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.with_rule(pattern, MockReply::Text(response.into()))
    }

    /// Reply with text and citations when the prompt contains `pattern`.
    pub fn with_grounded_response_on(
        self,
        pattern: impl Into<String>,
        response: impl Into<String>,
        citations: Vec<GroundingCitation>,
    ) -> Self {
        self.with_rule(
            pattern,
            MockReply::Grounded {
                text: response.into(),
                citations,
            },
        )
    }

    /// Fail when the prompt contains `pattern`.
    pub fn with_failure_on(self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_rule(pattern, MockReply::Failure(message.into()))
    }

    /// Add a rule; earlier rules take precedence.
    pub fn with_rule(mut self, pattern: impl Into<String>, reply: MockReply) -> Self {
        Arc::make_mut(&mut self.config).rules.push(MockRule {
            pattern: pattern.into(),
            reply,
        });
        self
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Make `health_check` report unavailable.
    pub fn unhealthy(mut self) -> Self {
        Arc::make_mut(&mut self.config).healthy = false;
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    /// Prompts of all calls, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.log().iter().map(|c| c.prompt.clone()).collect()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    fn reply_for(&self, prompt: &str) -> &MockReply {
        self.config
            .rules
            .iter()
            .find(|rule| prompt.contains(&rule.pattern))
            .map(|rule| &rule.reply)
            .unwrap_or(&self.config.default_reply)
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        options.validate()?;

        self.log().push(MockCall {
            prompt: prompt.to_string(),
            options: options.clone(),
            timestamp: std::time::Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match self.reply_for(prompt) {
            MockReply::Text(text) => Ok(GenerationOutput::text(text.clone())),
            MockReply::Grounded { text, citations } => Ok(GenerationOutput {
                text: text.clone(),
                citations: citations.clone(),
            }),
            MockReply::Failure(message) => Err(Error::UpstreamFailure(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.healthy)
    }
}
