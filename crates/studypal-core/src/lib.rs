//! # studypal-core
//!
//! Core types, traits and text utilities for studypal.
//!
//! This crate provides:
//! - Domain models (generation requests, quiz items, saved library entries)
//! - Collaborator traits (generation backend, text extraction, persistence)
//! - The paragraph-first note chunker
//! - Tolerant JSON recovery for model output
//! - Error types, shared defaults and logging field names

pub mod chunking;
pub mod defaults;
pub mod error;
pub mod json_extract;
pub mod logging;
pub mod models;
pub mod traits;

pub use chunking::{chunk_text, Chunker, ChunkerConfig, NoteChunker, TextChunk};
pub use error::{Error, Result};
pub use json_extract::{extract_as, extract_items, extract_json};
pub use models::*;
pub use traits::*;
