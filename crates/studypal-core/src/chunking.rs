//! Splits long notes into model-sized chunks.
//!
//! Paragraph boundaries (two or more newlines) are preferred; a paragraph that
//! alone exceeds the limit is split on sentence boundaries instead. A single
//! sentence longer than the limit is emitted as-is and flagged `oversized`.
//!
//! Lengths are measured in `char`s. Chunk spans are contiguous, so
//! concatenating `text[start_offset..end_offset]` over all chunks reproduces
//! the input exactly; `TextChunk::text` is the trimmed content of that span.
//!
//! # Example
//!
//! ```rust,ignore
//! use studypal_core::chunking::chunk_text;
//!
//! let chunks = chunk_text(&notes, 32_000)?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults;
use crate::error::{Error, Result};

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Configuration for the note chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk.
    pub max_chunk_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: defaults::CHUNK_CHAR_LIMIT,
        }
    }
}

/// A chunk of text with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Trimmed chunk content.
    pub text: String,
    /// Starting byte offset of the span in the original text.
    pub start_offset: usize,
    /// Ending byte offset (exclusive) of the span in the original text.
    pub end_offset: usize,
    /// True when the chunk is a single sentence longer than the limit.
    pub oversized: bool,
}

impl TextChunk {
    /// Length of the chunk content in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Common trait for chunking strategies.
pub trait Chunker: Send + Sync {
    /// Chunk the text into positioned chunks.
    fn chunk_spans(&self, text: &str) -> Vec<TextChunk>;

    /// Chunk the text into plain strings.
    fn chunk(&self, text: &str) -> Vec<String> {
        self.chunk_spans(text).into_iter().map(|c| c.text).collect()
    }

    /// Get the configuration used by this chunker.
    fn config(&self) -> &ChunkerConfig;
}

/// Paragraph-first chunker with a sentence fallback.
#[derive(Debug, Clone)]
pub struct NoteChunker {
    config: ChunkerConfig,
}

impl NoteChunker {
    /// Create a chunker; a zero limit is rejected.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        if config.max_chunk_chars == 0 {
            return Err(Error::InvalidArgument(
                "chunk limit must be greater than zero".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn with_limit(max_chunk_chars: usize) -> Result<Self> {
        Self::new(ChunkerConfig { max_chunk_chars })
    }

    /// Byte ranges of non-blank paragraphs.
    fn paragraphs(text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        for sep in PARAGRAPH_BREAK.find_iter(text) {
            if !text[start..sep.start()].trim().is_empty() {
                spans.push((start, sep.start()));
            }
            start = sep.end();
        }
        if !text[start..].trim().is_empty() {
            spans.push((start, text.len()));
        }
        spans
    }

    /// Byte ranges of sentences inside `text[start..end]`.
    ///
    /// A sentence is everything up to and including a run of terminators;
    /// trailing unterminated text forms the last sentence.
    fn sentences(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut cursor = start;
        for term in SENTENCE_END.find_iter(&text[start..end]) {
            let sentence_end = start + term.end();
            spans.push((cursor, sentence_end));
            cursor = sentence_end;
        }
        if cursor < end && !text[cursor..end].trim().is_empty() {
            spans.push((cursor, end));
        }
        spans
    }

    /// Greedily pack contiguous units into ranges bounded by the limit.
    fn pack(&self, text: &str, units: &[(usize, usize)], out: &mut Vec<(usize, usize, bool)>) {
        let limit = self.config.max_chunk_chars;
        let mut buffer: Option<(usize, usize, usize)> = None; // (start, end, chars)

        for &(us, ue) in units {
            buffer = match buffer {
                None => Some((us, ue, text[us..ue].chars().count())),
                Some((bs, be, chars)) => {
                    let extended = chars + text[be..ue].chars().count();
                    if extended > limit {
                        out.push((bs, be, chars > limit));
                        Some((us, ue, text[us..ue].chars().count()))
                    } else {
                        Some((bs, ue, extended))
                    }
                }
            };
        }
        if let Some((bs, be, chars)) = buffer {
            out.push((bs, be, chars > limit));
        }
    }
}

impl Default for NoteChunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

impl Chunker for NoteChunker {
    fn chunk_spans(&self, text: &str) -> Vec<TextChunk> {
        let limit = self.config.max_chunk_chars;
        if text.chars().count() <= limit {
            return vec![TextChunk {
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len(),
                oversized: false,
            }];
        }

        // Raw ranges before trimming and tiling.
        let mut ranges: Vec<(usize, usize, bool)> = Vec::new();
        let mut pending: Vec<(usize, usize)> = Vec::new();

        for (ps, pe) in Self::paragraphs(text) {
            if text[ps..pe].chars().count() > limit {
                self.pack(text, &pending, &mut ranges);
                pending.clear();
                let sentences = Self::sentences(text, ps, pe);
                self.pack(text, &sentences, &mut ranges);
            } else {
                pending.push((ps, pe));
            }
        }
        self.pack(text, &pending, &mut ranges);

        // Trim each range down to its content.
        let content: Vec<(usize, usize, bool)> = ranges
            .into_iter()
            .filter_map(|(s, e, oversized)| {
                let raw = &text[s..e];
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let lead = raw.len() - raw.trim_start().len();
                let oversized = oversized && trimmed.chars().count() > limit;
                Some((s + lead, s + lead + trimmed.len(), oversized))
            })
            .collect();

        // Tile the source: each span runs to the next chunk's content start.
        let count = content.len();
        let mut chunks = Vec::with_capacity(count);
        let mut span_start = 0;
        for (i, &(cs, ce, oversized)) in content.iter().enumerate() {
            let span_end = if i + 1 < count {
                content[i + 1].0
            } else {
                text.len()
            };
            chunks.push(TextChunk {
                text: text[cs..ce].to_string(),
                start_offset: span_start,
                end_offset: span_end,
                oversized,
            });
            span_start = span_end;
        }
        chunks
    }

    fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}

/// Split `text` into chunks of at most `limit` characters.
pub fn chunk_text(text: &str, limit: usize) -> Result<Vec<String>> {
    Ok(NoteChunker::with_limit(limit)?.chunk(text))
}
