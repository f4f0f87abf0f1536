//! Structured logging schema and field name constants for studypal.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log queries can rely on the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Failure surfaced to the user in place of generated content |
//! | WARN  | Tolerated failure, fallback applied (skipped chunk, dropped item) |
//! | INFO  | Operation completions, startup |
//! | DEBUG | Decision points (single-call vs chunked), config choices |
//! | TRACE | Per-chunk and per-item detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "inference", "study", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "openai", "orchestrator", "chunker", "library"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "map_reduce", "map_aggregate", "extract_topics"
pub const OPERATION: &str = "op";

// ─── Request fields ────────────────────────────────────────────────────────

/// Content kind being generated (`ContentKind` display form).
pub const KIND: &str = "kind";

/// Subject context attached to a request.
pub const SUBJECT: &str = "subject";

/// Number of exclusion entries embedded in a prompt.
pub const EXCLUSION_COUNT: &str = "exclusion_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of chunks produced or processed.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Zero-based index of the chunk being processed.
pub const CHUNK_INDEX: &str = "chunk_index";

/// Character length of the source text.
pub const SOURCE_LEN: &str = "source_len";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of generated items returned.
pub const ITEM_COUNT: &str = "item_count";

/// Number of grounding citations returned.
pub const CITATION_COUNT: &str = "citation_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for generation.
pub const MODEL: &str = "model";

/// Whether structured (JSON) output was requested.
pub const JSON_MODE: &str = "json_mode";

/// Whether search grounding was requested.
pub const SEARCH: &str = "search";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Prefix of the raw model text attached to a malformed response.
pub const RAW_PREVIEW: &str = "raw_preview";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
