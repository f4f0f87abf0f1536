//! Centralized default constants for studypal.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the CLI reference these constants instead of defining their
//! own magic numbers.
//!
//! All character budgets count Unicode scalar values, not bytes.

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum characters of source text sent to the model in one call.
///
/// Roughly 8k tokens at ~4 chars/token; long-context models keep most notes
/// in a single call at this size.
pub const CHUNK_CHAR_LIMIT: usize = 32_000;

/// Maximum characters per user-facing note part.
pub const NOTE_PART_CHAR_LIMIT: usize = 30_000;

/// Separator inserted between paragraphs when chunk text is rebuilt.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

// =============================================================================
// PREVIEW WINDOWS
// =============================================================================

/// Notes preview sent to the past-paper topic extraction call.
pub const TOPIC_PREVIEW_CHARS: usize = 15_000;

/// Notes preview sent to Hurry Study topic extraction.
pub const HURRY_TOPIC_PREVIEW_CHARS: usize = 25_000;

/// Notes preview sent to topic explanation, theory and drill generation.
pub const HURRY_CONTENT_PREVIEW_CHARS: usize = 30_000;

/// Notes preview sent alongside theory grading.
pub const GRADING_PREVIEW_CHARS: usize = 20_000;

// =============================================================================
// ITEM COUNTS
// =============================================================================

/// Items requested for a quiz kind in a single (unchunked) call.
pub const ITEMS_PER_CALL: usize = 5;

/// Items requested per chunk when a quiz is aggregated across chunks.
pub const ITEMS_PER_CHUNK: usize = 2;

/// Most recent exclusion entries embedded in a prompt.
pub const EXCLUSION_LIMIT: usize = 50;

/// Maximum Hurry Study topics extracted from notes.
pub const HURRY_MAX_TOPICS: usize = 6;

/// Theory questions per difficulty level in Hurry Study.
pub const THEORY_QUESTIONS_PER_LEVEL: usize = 5;

/// Marks for an easy theory question.
pub const THEORY_EASY_MAX_SCORE: u32 = 3;

/// Marks for a hard theory question.
pub const THEORY_HARD_MAX_SCORE: u32 = 6;

/// Drill questions per format (true/false and MCQ).
pub const DRILL_QUESTIONS_PER_FORMAT: usize = 10;

/// Last exam year covered by past-paper searches.
pub const PAST_PAPER_END_YEAR: i32 = 2025;

// =============================================================================
// GENERATION SERVICE
// =============================================================================

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const GEN_MODEL: &str = "gemini-2.5-flash";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for health check requests (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Generation calls slower than this are logged as slow (milliseconds).
pub const SLOW_GENERATION_MS: u64 = 30_000;

// =============================================================================
// INGESTION
// =============================================================================

/// Separator placed between PDF pages in extracted text.
pub const PDF_PAGE_SEPARATOR: &str = "\n";

/// Timeout for external extraction commands (seconds).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// STORAGE
// =============================================================================

/// Storage key for saved notes.
pub const SAVED_NOTES_KEY: &str = "igcseStudyPalSavedNotes";

/// Storage key for saved past papers.
pub const SAVED_PAPERS_KEY: &str = "igcseStudyPalSavedPapers";

/// Default data directory for the file-backed store.
pub const DATA_DIR: &str = ".studypal";
