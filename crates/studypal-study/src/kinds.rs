//! Per-kind dispatch table: prompt builder, response schema and
//! aggregation strategy for every `ContentKind`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use studypal_core::{
    defaults, extract_items, ContentKind, Error, Flashcard, GeneratedContent, GroundingCitation,
    McqQuestion, PastPaperQuestion, Result, SourcedMcqQuestion, TrueFalseQuestion,
};

use crate::prompts::{self, PromptContext};
use crate::schema;

/// How a kind is produced when the notes do not fit in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationStrategy {
    /// Partial summaries per chunk, then one combining call.
    MapReduce,
    /// Items per chunk, concatenated in chunk order.
    MapAggregate,
    /// Always one topic extraction call plus one search-grounded call.
    SearchGrounded,
}

/// Dispatch entry for one content kind.
#[derive(Clone, Copy)]
pub struct KindSpec {
    pub kind: ContentKind,
    pub prompt: fn(&PromptContext<'_>) -> String,
    pub schema: Option<fn() -> Value>,
    pub strategy: AggregationStrategy,
}

impl std::fmt::Debug for KindSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindSpec")
            .field("kind", &self.kind)
            .field("structured", &self.schema.is_some())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// First step of the past-paper protocol; the grounded search prompt is
/// built from its result.
fn past_papers_prompt(ctx: &PromptContext<'_>) -> String {
    prompts::topic_extraction(
        prompts::preview(ctx.notes, defaults::TOPIC_PREVIEW_CHARS),
        ctx.subject,
    )
}

static KIND_TABLE: [KindSpec; 6] = [
    KindSpec {
        kind: ContentKind::BriefSummary,
        prompt: prompts::brief_summary,
        schema: None,
        strategy: AggregationStrategy::MapReduce,
    },
    KindSpec {
        kind: ContentKind::DetailedSummary,
        prompt: prompts::detailed_summary,
        schema: None,
        strategy: AggregationStrategy::MapReduce,
    },
    KindSpec {
        kind: ContentKind::Flashcards,
        prompt: prompts::flashcards,
        schema: Some(schema::flashcard_list as fn() -> Value),
        strategy: AggregationStrategy::MapAggregate,
    },
    KindSpec {
        kind: ContentKind::Mcqs,
        prompt: prompts::mcqs,
        schema: Some(schema::mcq_list as fn() -> Value),
        strategy: AggregationStrategy::MapAggregate,
    },
    KindSpec {
        kind: ContentKind::TrueFalse,
        prompt: prompts::true_false,
        schema: Some(schema::true_false_list as fn() -> Value),
        strategy: AggregationStrategy::MapAggregate,
    },
    KindSpec {
        kind: ContentKind::PastPapers,
        prompt: past_papers_prompt,
        schema: None,
        strategy: AggregationStrategy::SearchGrounded,
    },
];

/// Look up the dispatch entry for a kind.
pub fn spec_for(kind: ContentKind) -> &'static KindSpec {
    let index = match kind {
        ContentKind::BriefSummary => 0,
        ContentKind::DetailedSummary => 1,
        ContentKind::Flashcards => 2,
        ContentKind::Mcqs => 3,
        ContentKind::TrueFalse => 4,
        ContentKind::PastPapers => 5,
    };
    &KIND_TABLE[index]
}

/// Keep valid items, logging how many were dropped.
fn keep_valid<T>(kind: ContentKind, items: Vec<T>, is_valid: impl Fn(&T) -> bool) -> Vec<T> {
    let total = items.len();
    let kept: Vec<T> = items.into_iter().filter(|item| is_valid(item)).collect();
    if kept.len() < total {
        warn!(
            kind = %kind,
            dropped = total - kept.len(),
            kept = kept.len(),
            "Dropped invalid items from model output"
        );
    }
    kept
}

fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    extract_items::<T>(text)
}

/// Parse model text into content of the given kind.
///
/// Summaries are returned verbatim. Item kinds go through the
/// tolerant extractor; MCQ answers given as option letters are mapped to
/// the option text, and items that still fail validation are dropped.
pub fn parse_output(kind: ContentKind, text: &str) -> Result<GeneratedContent> {
    Ok(match kind {
        ContentKind::BriefSummary => GeneratedContent::BriefSummary(text.to_string()),
        ContentKind::DetailedSummary => GeneratedContent::DetailedSummary(text.to_string()),
        ContentKind::Flashcards => GeneratedContent::Flashcards(keep_valid(
            kind,
            parse_list::<Flashcard>(text)?,
            Flashcard::is_valid,
        )),
        ContentKind::Mcqs => GeneratedContent::Mcqs(keep_valid(
            kind,
            parse_list::<McqQuestion>(text)?
                .into_iter()
                .map(McqQuestion::normalized)
                .collect(),
            McqQuestion::is_valid,
        )),
        ContentKind::TrueFalse => GeneratedContent::TrueFalse(keep_valid(
            kind,
            parse_list::<TrueFalseQuestion>(text)?,
            TrueFalseQuestion::is_valid,
        )),
        ContentKind::PastPapers => GeneratedContent::PastPapers(keep_valid(
            kind,
            parse_list::<PastPaperQuestion>(text)?,
            PastPaperQuestion::is_valid,
        )),
    })
}

/// Parse search-grounded MCQs, keeping valid ones.
pub fn parse_sourced_mcqs(text: &str) -> Result<Vec<SourcedMcqQuestion>> {
    let items = parse_list::<SourcedMcqQuestion>(text)?
        .into_iter()
        .map(SourcedMcqQuestion::normalized)
        .collect();
    Ok(keep_valid(ContentKind::Mcqs, items, SourcedMcqQuestion::is_valid))
}

/// Empty content of a kind, the starting point for aggregation.
pub fn empty_content(kind: ContentKind) -> GeneratedContent {
    match kind {
        ContentKind::BriefSummary => GeneratedContent::BriefSummary(String::new()),
        ContentKind::DetailedSummary => GeneratedContent::DetailedSummary(String::new()),
        ContentKind::Flashcards => GeneratedContent::Flashcards(Vec::new()),
        ContentKind::Mcqs => GeneratedContent::Mcqs(Vec::new()),
        ContentKind::TrueFalse => GeneratedContent::TrueFalse(Vec::new()),
        ContentKind::PastPapers => GeneratedContent::PastPapers(Vec::new()),
    }
}

/// Append the items of `next` to `acc`; both must be the same item kind.
pub fn append_items(acc: &mut GeneratedContent, next: GeneratedContent) -> Result<()> {
    match (acc, next) {
        (GeneratedContent::Flashcards(a), GeneratedContent::Flashcards(b)) => a.extend(b),
        (GeneratedContent::Mcqs(a), GeneratedContent::Mcqs(b)) => a.extend(b),
        (GeneratedContent::TrueFalse(a), GeneratedContent::TrueFalse(b)) => a.extend(b),
        (GeneratedContent::PastPapers(a), GeneratedContent::PastPapers(b)) => a.extend(b),
        (GeneratedContent::SourcedMcqs(a), GeneratedContent::SourcedMcqs(b)) => a.extend(b),
        (a, b) => {
            return Err(Error::Internal(format!(
                "cannot merge {} into {}",
                b.type_name(),
                a.type_name()
            )))
        }
    }
    Ok(())
}

fn normalize_for_match(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Remove items whose text matches an exclusion entry (case-insensitive,
/// whitespace-normalized). Returns the number removed.
pub fn dedup_against(content: &mut GeneratedContent, exclusions: &[String]) -> usize {
    if exclusions.is_empty() {
        return 0;
    }
    let excluded: std::collections::HashSet<String> =
        exclusions.iter().map(|e| normalize_for_match(e)).collect();
    let keep = |text: &str| !excluded.contains(&normalize_for_match(text));

    let before = content.item_count();
    match content {
        GeneratedContent::BriefSummary(_) | GeneratedContent::DetailedSummary(_) => return 0,
        GeneratedContent::Flashcards(items) => items.retain(|i| keep(&i.front)),
        GeneratedContent::Mcqs(items) => items.retain(|i| keep(&i.question)),
        GeneratedContent::TrueFalse(items) => items.retain(|i| keep(&i.statement)),
        GeneratedContent::PastPapers(items) => items.retain(|i| keep(&i.question)),
        GeneratedContent::SourcedMcqs(items) => items.retain(|i| keep(&i.question)),
    }
    before - content.item_count()
}

fn needs_citation_url(url: Option<&str>) -> bool {
    match url {
        None => true,
        Some(u) => u.trim().is_empty() || u.contains("placeholder.com"),
    }
}

/// Fill missing or placeholder past-paper URLs from grounding citations,
/// cycling through citations by item index.
pub fn apply_citations_to_papers(items: &mut [PastPaperQuestion], citations: &[GroundingCitation]) {
    if citations.is_empty() {
        return;
    }
    for (i, item) in items.iter_mut().enumerate() {
        if needs_citation_url(item.source_url.as_deref()) {
            item.source_url = Some(citations[i % citations.len()].uri.clone());
        }
    }
}

/// Same as [`apply_citations_to_papers`] for sourced MCQs.
pub fn apply_citations_to_mcqs(items: &mut [SourcedMcqQuestion], citations: &[GroundingCitation]) {
    if citations.is_empty() {
        return;
    }
    for (i, item) in items.iter_mut().enumerate() {
        if needs_citation_url(Some(&item.source_url)) {
            item.source_url = citations[i % citations.len()].uri.clone();
        }
    }
}
