//! Content orchestrator: turns notes plus a content kind into generated
//! study material.
//!
//! Notes that fit within the chunk limit are answered with exactly one
//! call. Longer notes are chunked and handled per the kind's
//! [`AggregationStrategy`]:
//!
//! - summaries: concurrent brief summary per chunk, then one combining call
//! - quiz items: one call per chunk in order, with fewer items per chunk
//! - past papers: topic extraction, then a search-grounded call (never chunked)

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use studypal_core::{
    defaults, extract_as, Chunker, ContentKind, Error, GeneratedContent, GenerationBackend,
    GenerationOptions, GenerationRequest, NoteChunker, Result, TopicContext,
};

use crate::kinds::{self, AggregationStrategy, KindSpec};
use crate::prompts::{self, PromptContext};

/// What to do when one call of a multi-call strategy fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failed call fails the whole request.
    FailFast,
    /// Failed calls are skipped with a warning.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "fail-fast" | "failfast" | "strict" => Ok(Self::FailFast),
            "best-effort" | "besteffort" | "skip" => Ok(Self::BestEffort),
            _ => Err(Error::Config(format!("Invalid failure policy: {}", s))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum characters of notes per generation call.
    pub chunk_limit: usize,
    /// Most recent exclusion entries embedded in prompts.
    pub exclusion_limit: usize,
    /// Policy for the map step of chunked summaries.
    pub summary_policy: FailurePolicy,
    /// Policy for per-chunk quiz item calls.
    pub item_policy: FailurePolicy,
    /// Drop generated items that match an exclusion entry.
    pub dedup_exclusions: bool,
    /// Items requested when the notes fit in one call.
    pub items_per_call: usize,
    /// Items requested per chunk when aggregating.
    pub items_per_chunk: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            chunk_limit: defaults::CHUNK_CHAR_LIMIT,
            exclusion_limit: defaults::EXCLUSION_LIMIT,
            summary_policy: FailurePolicy::FailFast,
            item_policy: FailurePolicy::BestEffort,
            dedup_exclusions: false,
            items_per_call: defaults::ITEMS_PER_CALL,
            items_per_chunk: defaults::ITEMS_PER_CHUNK,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", name, raw, e))),
        _ => Ok(default),
    }
}

impl OrchestratorConfig {
    /// Read overrides from `STUDYPAL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let base = Self::default();
        let config = Self {
            chunk_limit: env_or("STUDYPAL_CHUNK_LIMIT", base.chunk_limit)?,
            exclusion_limit: env_or("STUDYPAL_EXCLUSION_LIMIT", base.exclusion_limit)?,
            summary_policy: env_or("STUDYPAL_SUMMARY_POLICY", base.summary_policy)?,
            item_policy: env_or("STUDYPAL_ITEM_POLICY", base.item_policy)?,
            dedup_exclusions: env_or("STUDYPAL_DEDUP_EXCLUSIONS", base.dedup_exclusions)?,
            ..base
        };
        debug!(
            chunk_limit = config.chunk_limit,
            exclusion_limit = config.exclusion_limit,
            summary_policy = %config.summary_policy,
            item_policy = %config.item_policy,
            dedup_exclusions = config.dedup_exclusions,
            "Loaded orchestrator configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_limit == 0 {
            return Err(Error::Config("chunk limit must be greater than zero".to_string()));
        }
        if self.items_per_call == 0 || self.items_per_chunk == 0 {
            return Err(Error::Config("item counts must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Generates study content from notes through a [`GenerationBackend`].
pub struct ContentOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    config: OrchestratorConfig,
    chunker: NoteChunker,
}

impl ContentOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        let chunker = NoteChunker::with_limit(config.chunk_limit)?;
        Ok(Self {
            backend,
            config,
            chunker,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate content of `request.kind` from `request.source_text`.
    #[instrument(
        skip(self, request),
        fields(
            subsystem = "study",
            component = "orchestrator",
            op = "generate",
            kind = %request.kind,
            source_len = request.source_text.chars().count(),
            exclusion_count = request.exclusions.len()
        )
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        if request.source_text.trim().is_empty() {
            return Err(Error::InvalidArgument("notes are empty".to_string()));
        }
        let start = Instant::now();
        let spec = kinds::spec_for(request.kind);
        let exclusions =
            prompts::recent_exclusions(&request.exclusions, self.config.exclusion_limit);
        let subject = request.subject.as_deref();
        let text = request.source_text.as_str();

        let mut content = if spec.strategy == AggregationStrategy::SearchGrounded {
            self.past_papers(spec, text, subject, exclusions).await?
        } else if text.chars().count() <= self.config.chunk_limit {
            debug!("Notes fit in a single call");
            let ctx = PromptContext::new(text, subject, self.config.items_per_call)
                .with_exclusions(exclusions);
            self.single_call(spec, &ctx).await?
        } else {
            let chunks = self.chunker.chunk(text);
            debug!(chunk_count = chunks.len(), strategy = ?spec.strategy, "Notes chunked");
            match spec.strategy {
                AggregationStrategy::MapReduce => {
                    self.map_reduce(request.kind, &chunks, subject).await?
                }
                _ => self.map_aggregate(spec, &chunks, subject, exclusions).await?,
            }
        };

        if self.config.dedup_exclusions {
            let removed = kinds::dedup_against(&mut content, exclusions);
            if removed > 0 {
                info!(removed, "Removed items repeating excluded content");
            }
        }

        info!(
            item_count = content.item_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Content generated"
        );
        Ok(content)
    }

    /// One call over one piece of text, parsed per the kind.
    async fn single_call(&self, spec: &KindSpec, ctx: &PromptContext<'_>) -> Result<GeneratedContent> {
        let prompt = (spec.prompt)(ctx);
        let options = match spec.schema {
            Some(schema) => GenerationOptions::structured(schema()),
            None => GenerationOptions::text(),
        };
        let output = self.backend.generate_with_options(&prompt, &options).await?;
        kinds::parse_output(spec.kind, &output.text).map_err(|e| {
            error!(
                kind = %spec.kind,
                error = %e,
                raw_preview = ?e.raw_preview(),
                "Model returned an invalid format"
            );
            e
        })
    }

    async fn map_reduce(
        &self,
        kind: ContentKind,
        chunks: &[String],
        subject: Option<&str>,
    ) -> Result<GeneratedContent> {
        let brief = kinds::spec_for(ContentKind::BriefSummary);
        let calls = chunks.iter().map(|chunk| {
            let ctx = PromptContext::new(chunk, subject, 0);
            async move { self.single_call(brief, &ctx).await }
        });
        let results = join_all(calls).await;

        let mut partials = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (chunk_index, result) in results.into_iter().enumerate() {
            match result {
                Ok(GeneratedContent::BriefSummary(text)) => partials.push(text),
                Ok(other) => {
                    return Err(Error::Internal(format!(
                        "expected a summary, got {}",
                        other.type_name()
                    )))
                }
                Err(e) if self.config.summary_policy == FailurePolicy::FailFast => {
                    error!(chunk_index, error = %e, "Chunk summary failed");
                    return Err(e);
                }
                Err(e) => {
                    warn!(chunk_index, error = %e, "Chunk summary failed, skipping");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if partials.is_empty() {
            return Err(first_error
                .unwrap_or_else(|| Error::Internal("no chunk summaries produced".to_string())));
        }

        debug!(partial_count = partials.len(), "Reducing chunk summaries");
        let detailed = kind == ContentKind::DetailedSummary;
        let output = self
            .backend
            .generate_with_options(
                &prompts::reduce_summaries(&partials, detailed),
                &GenerationOptions::text(),
            )
            .await?;
        let summary = output.text;
        Ok(if detailed {
            GeneratedContent::DetailedSummary(summary)
        } else {
            GeneratedContent::BriefSummary(summary)
        })
    }

    async fn map_aggregate(
        &self,
        spec: &KindSpec,
        chunks: &[String],
        subject: Option<&str>,
        exclusions: &[String],
    ) -> Result<GeneratedContent> {
        let mut content = kinds::empty_content(spec.kind);
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let ctx = PromptContext::new(chunk, subject, self.config.items_per_chunk)
                .with_exclusions(exclusions);
            match self.single_call(spec, &ctx).await {
                Ok(items) => {
                    debug!(chunk_index, item_count = items.item_count(), "Chunk items generated");
                    kinds::append_items(&mut content, items)?;
                }
                Err(e) if self.config.item_policy == FailurePolicy::FailFast => {
                    error!(chunk_index, error = %e, "Chunk generation failed");
                    return Err(e);
                }
                Err(e) => {
                    warn!(chunk_index, error = %e, "Could not generate content for chunk, skipping");
                }
            }
        }
        Ok(content)
    }

    /// Identify the topic, then search for real past-paper questions.
    async fn past_papers(
        &self,
        spec: &KindSpec,
        text: &str,
        subject: Option<&str>,
        exclusions: &[String],
    ) -> Result<GeneratedContent> {
        let context = self.extract_topic(spec, text, subject).await;
        let topic = if context.topic.trim().is_empty() {
            context.search_query.as_str()
        } else {
            context.topic.as_str()
        };
        info!(topic, search_query = %context.search_query, "Searching for past paper questions");

        let output = self
            .backend
            .generate_grounded(&prompts::past_papers_search(
                topic,
                &context.search_query,
                exclusions,
            ))
            .await?;
        let mut content = kinds::parse_output(ContentKind::PastPapers, &output.text)?;
        if let GeneratedContent::PastPapers(items) = &mut content {
            kinds::apply_citations_to_papers(items, &output.citations);
        }
        debug!(citation_count = output.citations.len(), "Applied grounding citations");
        Ok(content)
    }

    /// JSON-mode topic extraction; failures fall back to a generic query.
    async fn extract_topic(
        &self,
        spec: &KindSpec,
        text: &str,
        subject: Option<&str>,
    ) -> TopicContext {
        let prompt = (spec.prompt)(&PromptContext::new(text, subject, 0));
        let extracted = match self
            .backend
            .generate_with_options(&prompt, &GenerationOptions::json())
            .await
        {
            Ok(output) => extract_as::<TopicContext>(&output.text),
            Err(e) => Err(e),
        };

        match extracted {
            Ok(context) if !context.search_query.trim().is_empty() => context,
            Ok(_) => {
                warn!("Topic extraction returned no search query, falling back to generic search");
                Self::fallback_context(subject)
            }
            Err(e) => {
                warn!(error = %e, "Topic extraction failed, falling back to generic search");
                Self::fallback_context(subject)
            }
        }
    }

    fn fallback_context(subject: Option<&str>) -> TopicContext {
        TopicContext {
            subject: subject.unwrap_or_default().to_string(),
            topic: String::new(),
            search_query: prompts::fallback_search_query(subject),
        }
    }
}
