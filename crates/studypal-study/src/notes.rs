//! Note tools: cleaning raw notes, splitting long notes into parts, and
//! turning pasted question sets (SME) into structured quizzes.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use studypal_core::{
    defaults, Chunker, ContentKind, Error, GeneratedContent, GenerationBackend, GenerationOptions,
    NoteChunker, Result,
};

use crate::kinds;
use crate::prompts;
use crate::schema;

/// User-facing parts of a long note with a cursor for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteParts {
    parts: Vec<String>,
    current: usize,
}

impl NoteParts {
    /// Split `text` into parts of at most `limit` characters.
    ///
    /// Text within the limit becomes a single part, unchanged.
    pub fn split(text: &str, limit: usize) -> Result<Self> {
        let chunker = NoteChunker::with_limit(limit)?;
        let mut parts = chunker.chunk(text);
        if parts.is_empty() {
            parts.push(String::new());
        }
        debug!(part_count = parts.len(), limit, "Split note into parts");
        Ok(Self { parts, current: 0 })
    }

    /// Split with the default part limit.
    pub fn split_default(text: &str) -> Result<Self> {
        Self::split(text, defaults::NOTE_PART_CHAR_LIMIT)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Zero-based index of the current part.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &str {
        &self.parts[self.current]
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.parts.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    /// Move to the next part; `None` at the last part.
    pub fn next_part(&mut self) -> Option<&str> {
        if !self.has_next() {
            return None;
        }
        self.current += 1;
        Some(self.current())
    }

    /// Move to the previous part; `None` at the first part.
    pub fn previous_part(&mut self) -> Option<&str> {
        if !self.has_previous() {
            return None;
        }
        self.current -= 1;
        Some(self.current())
    }

    /// Jump to part `index`.
    pub fn go_to(&mut self, index: usize) -> Result<&str> {
        if index >= self.parts.len() {
            return Err(Error::InvalidArgument(format!(
                "part {} out of range (note has {} parts)",
                index + 1,
                self.parts.len()
            )));
        }
        self.current = index;
        Ok(self.current())
    }
}

/// Model-backed note tools.
pub struct NoteTools {
    backend: Arc<dyn GenerationBackend>,
}

impl NoteTools {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Strip page numbers, headers, outcome sections and other
    /// non-educational text, keeping paragraphs.
    #[instrument(skip(self, raw), fields(subsystem = "study", component = "notes", op = "clean_notes", source_len = raw.len()))]
    pub async fn clean_notes(&self, raw: &str) -> Result<String> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidArgument("notes are empty".to_string()));
        }
        let cleaned = self.backend.generate(&prompts::clean_notes(raw)).await?;
        let cleaned = cleaned.trim().to_string();
        info!(response_len = cleaned.len(), "Notes cleaned");
        Ok(cleaned)
    }

    /// Extract existing MCQs from pasted text (solving missing answers),
    /// or generate 5-15 from plain notes.
    #[instrument(skip(self, raw), fields(subsystem = "study", component = "notes", op = "parse_sme", source_len = raw.len()))]
    pub async fn parse_sme_mcqs(&self, raw: &str) -> Result<GeneratedContent> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidArgument("question text is empty".to_string()));
        }
        self.structured_mcqs(&prompts::parse_sme(raw)).await
    }

    /// Generate 5-10 further MCQs avoiding `existing` question texts.
    #[instrument(skip(self, raw, existing), fields(subsystem = "study", component = "notes", op = "more_sme", existing = existing.len()))]
    pub async fn generate_more_sme_mcqs(
        &self,
        raw: &str,
        existing: &[String],
    ) -> Result<GeneratedContent> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidArgument("question text is empty".to_string()));
        }
        self.structured_mcqs(&prompts::more_sme(raw, existing)).await
    }

    async fn structured_mcqs(&self, prompt: &str) -> Result<GeneratedContent> {
        let output = self
            .backend
            .generate_with_options(prompt, &GenerationOptions::structured(schema::mcq_list()))
            .await?;
        let content = kinds::parse_output(ContentKind::Mcqs, &output.text)?;
        info!(item_count = content.item_count(), "MCQs parsed");
        Ok(content)
    }
}
