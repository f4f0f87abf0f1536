//! # studypal-study
//!
//! Study workflows built on a [`GenerationBackend`](studypal_core::GenerationBackend).
//!
//! This crate provides:
//! - The content orchestrator (single call, map-reduce summaries,
//!   map-aggregate quizzes, search-grounded past papers)
//! - Practice finders for past-paper MCQs, criteria-matched theory
//!   questions and syllabus-topic quizzes
//! - Note tools (cleaning, part splitting, SME quiz parsing)
//! - Hurry Study sessions (topics, explanation, graded theory test, drill)
//! - File ingestion and the saved library

pub mod hurry;
pub mod ingest;
pub mod kinds;
pub mod library;
pub mod notes;
pub mod orchestrator;
pub mod practice;
pub mod prompts;
pub mod schema;
pub mod syllabus;

pub use hurry::{qa_pairs, HurryStudy, TheoryAnswers, TheoryTest};
pub use ingest::{
    append_to_notes, extractor_for, ingest_bytes, ingest_file, PdfTextExtractor,
    PlainTextExtractor,
};
pub use kinds::{spec_for, AggregationStrategy, KindSpec};
pub use library::{derive_title, JsonFileStore, Library, MemoryStore};
pub use notes::{NoteParts, NoteTools};
pub use orchestrator::{ContentOrchestrator, FailurePolicy, OrchestratorConfig};
pub use practice::{year_text, year_window, PracticeFinder};
pub use syllabus::{chapters_for, combine_topics, find_chapter, Chapter};
