//! Domain models shared across studypal crates.
//!
//! Field names serialize in camelCase and content tags in kebab-case so
//! saved libraries and generated content stay interchangeable with the JSON
//! produced by the browser edition of the study app.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// CONTENT KINDS
// =============================================================================

/// What a generation request asks the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    BriefSummary,
    DetailedSummary,
    Flashcards,
    Mcqs,
    TrueFalse,
    PastPapers,
}

impl ContentKind {
    /// Every kind, in menu order.
    pub const ALL: [ContentKind; 6] = [
        ContentKind::BriefSummary,
        ContentKind::DetailedSummary,
        ContentKind::Flashcards,
        ContentKind::Mcqs,
        ContentKind::TrueFalse,
        ContentKind::PastPapers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BriefSummary => "brief-summary",
            Self::DetailedSummary => "detailed-summary",
            Self::Flashcards => "flashcards",
            Self::Mcqs => "mcqs",
            Self::TrueFalse => "true-false",
            Self::PastPapers => "past-papers",
        }
    }

    /// Prose summary kinds (map-reduce when chunked).
    pub fn is_summary(&self) -> bool {
        matches!(self, Self::BriefSummary | Self::DetailedSummary)
    }

    /// Discrete quiz item kinds (map-aggregate when chunked).
    pub fn is_item_kind(&self) -> bool {
        matches!(self, Self::Flashcards | Self::Mcqs | Self::TrueFalse)
    }

    /// Kinds answered with a search-grounded call.
    pub fn is_search_grounded(&self) -> bool {
        matches!(self, Self::PastPapers)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown content kind: {}", s)))
    }
}

// =============================================================================
// SUBJECTS
// =============================================================================

/// Supported IGCSE / O-Level subject papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IgcseSubject {
    PakStudiesP1,
    PakStudiesP2,
    IslamiyatP1,
    IslamiyatP2,
    PhysicsP1,
    PhysicsP2,
    PhysicsP4,
    ChemistryP1,
    ChemistryP2,
    ChemistryP4,
    ComputerScienceP1,
    ComputerScienceP2,
}

impl IgcseSubject {
    pub const ALL: [IgcseSubject; 12] = [
        IgcseSubject::PakStudiesP1,
        IgcseSubject::PakStudiesP2,
        IgcseSubject::IslamiyatP1,
        IgcseSubject::IslamiyatP2,
        IgcseSubject::PhysicsP1,
        IgcseSubject::PhysicsP2,
        IgcseSubject::PhysicsP4,
        IgcseSubject::ChemistryP1,
        IgcseSubject::ChemistryP2,
        IgcseSubject::ChemistryP4,
        IgcseSubject::ComputerScienceP1,
        IgcseSubject::ComputerScienceP2,
    ];

    /// Short identifier, e.g. `physics_p2`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PakStudiesP1 => "pak_studies_p1",
            Self::PakStudiesP2 => "pak_studies_p2",
            Self::IslamiyatP1 => "islamiyat_p1",
            Self::IslamiyatP2 => "islamiyat_p2",
            Self::PhysicsP1 => "physics_p1",
            Self::PhysicsP2 => "physics_p2",
            Self::PhysicsP4 => "physics_p4",
            Self::ChemistryP1 => "chemistry_p1",
            Self::ChemistryP2 => "chemistry_p2",
            Self::ChemistryP4 => "chemistry_p4",
            Self::ComputerScienceP1 => "cs_p1",
            Self::ComputerScienceP2 => "cs_p2",
        }
    }

    /// Display name used in prompts and as the saved-papers key.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PakStudiesP1 => "PakStudies P1",
            Self::PakStudiesP2 => "PakStudies P2",
            Self::IslamiyatP1 => "Islamiyat P1",
            Self::IslamiyatP2 => "Islamiyat P2",
            Self::PhysicsP1 => "Physics P1",
            Self::PhysicsP2 => "Physics P2",
            Self::PhysicsP4 => "Physics P4",
            Self::ChemistryP1 => "Chemistry P1",
            Self::ChemistryP2 => "Chemistry P2",
            Self::ChemistryP4 => "Chemistry P4",
            Self::ComputerScienceP1 => "Computer Science P1",
            Self::ComputerScienceP2 => "Computer Science P2",
        }
    }
}

impl fmt::Display for IgcseSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for IgcseSubject {
    type Err = Error;

    /// Accepts either the key (`physics_p2`) or the display name
    /// (`Physics P2`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        IgcseSubject::ALL
            .into_iter()
            .find(|subj| subj.key() == needle || subj.display_name().to_lowercase() == needle)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown subject: {}", s)))
    }
}

// =============================================================================
// GENERATION REQUEST
// =============================================================================

/// One user action asking for generated study material.
///
/// Created per action and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub source_text: String,
    pub kind: ContentKind,
    /// Subject context woven into prompts ("Physics P2").
    pub subject: Option<String>,
    /// Previously shown item texts, oldest first.
    pub exclusions: Vec<String>,
}

impl GenerationRequest {
    pub fn new(source_text: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            source_text: source_text.into(),
            kind,
            subject: None,
            exclusions: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }
}

// =============================================================================
// GENERATED ITEMS
// =============================================================================

/// Multiple-choice question with exactly four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// Number of options every MCQ must carry.
pub const MCQ_OPTION_COUNT: usize = 4;

impl McqQuestion {
    /// Map letter answers (`"B"`, `"(b)"`, `"Option C"`) and case variants
    /// onto the exact option text.
    pub fn normalized(mut self) -> Self {
        let answer = self.answer.trim().to_string();
        if self.options.iter().any(|o| *o == answer) {
            self.answer = answer;
            return self;
        }
        if let Some(idx) = option_letter_index(&answer) {
            if let Some(option) = self.options.get(idx) {
                self.answer = option.clone();
                return self;
            }
        }
        if let Some(option) = self
            .options
            .iter()
            .find(|o| o.trim().eq_ignore_ascii_case(&answer))
        {
            self.answer = option.clone();
        }
        self
    }

    /// Exactly four options, non-empty question, answer among the options.
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == MCQ_OPTION_COUNT
            && self.options.contains(&self.answer)
    }
}

/// Parse an option letter answer into a zero-based option index.
fn option_letter_index(answer: &str) -> Option<usize> {
    let lowered = answer.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("option")
        .unwrap_or(&lowered)
        .trim()
        .trim_matches(|c: char| c == '(' || c == ')' || c == '.' || c == ':')
        .trim();
    let mut chars = stripped.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='d'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

/// Past-paper MCQ found through search, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcedMcqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    /// e.g. "June 2022, Paper 1, Variant 2, Question 15"
    #[serde(default)]
    pub source_paper: String,
    #[serde(default)]
    pub source_url: String,
}

impl SourcedMcqQuestion {
    /// The question part, normalized the same way as plain MCQs.
    pub fn normalized(self) -> Self {
        let mcq = McqQuestion {
            question: self.question,
            options: self.options,
            answer: self.answer,
        }
        .normalized();
        Self {
            question: mcq.question,
            options: mcq.options,
            answer: mcq.answer,
            source_paper: self.source_paper,
            source_url: self.source_url,
        }
    }

    pub fn is_valid(&self) -> bool {
        McqQuestion {
            question: self.question.clone(),
            options: self.options.clone(),
            answer: self.answer.clone(),
        }
        .is_valid()
    }
}

/// True/false statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    pub statement: String,
    pub answer: bool,
}

impl TrueFalseQuestion {
    pub fn is_valid(&self) -> bool {
        !self.statement.trim().is_empty()
    }
}

/// Question/answer flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

impl Flashcard {
    pub fn is_valid(&self) -> bool {
        !self.front.trim().is_empty() && !self.back.trim().is_empty()
    }
}

/// Difficulty grade of a past-paper question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy", alias = "EASY")]
    Easy,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "hard", alias = "HARD")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

/// Past-paper style theory question with a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastPaperQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PastPaperQuestion {
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
    }
}

/// Source URI returned alongside search-grounded generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingCitation {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// =============================================================================
// GENERATED CONTENT
// =============================================================================

/// Result of one generation action, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum GeneratedContent {
    BriefSummary(String),
    DetailedSummary(String),
    Flashcards(Vec<Flashcard>),
    Mcqs(Vec<McqQuestion>),
    TrueFalse(Vec<TrueFalseQuestion>),
    PastPapers(Vec<PastPaperQuestion>),
    SourcedMcqs(Vec<SourcedMcqQuestion>),
}

impl GeneratedContent {
    /// Kebab-case type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::BriefSummary(_) => "brief-summary",
            Self::DetailedSummary(_) => "detailed-summary",
            Self::Flashcards(_) => "flashcards",
            Self::Mcqs(_) => "mcqs",
            Self::TrueFalse(_) => "true-false",
            Self::PastPapers(_) => "past-papers",
            Self::SourcedMcqs(_) => "sourced-mcqs",
        }
    }

    /// Number of discrete items (summaries count as one).
    pub fn item_count(&self) -> usize {
        match self {
            Self::BriefSummary(_) | Self::DetailedSummary(_) => 1,
            Self::Flashcards(items) => items.len(),
            Self::Mcqs(items) => items.len(),
            Self::TrueFalse(items) => items.len(),
            Self::PastPapers(items) => items.len(),
            Self::SourcedMcqs(items) => items.len(),
        }
    }

    /// Item texts suitable for feeding back as an exclusion list.
    pub fn item_texts(&self) -> Vec<String> {
        match self {
            Self::BriefSummary(_) | Self::DetailedSummary(_) => Vec::new(),
            Self::Flashcards(items) => items.iter().map(|i| i.front.clone()).collect(),
            Self::Mcqs(items) => items.iter().map(|i| i.question.clone()).collect(),
            Self::TrueFalse(items) => items.iter().map(|i| i.statement.clone()).collect(),
            Self::PastPapers(items) => items.iter().map(|i| i.question.clone()).collect(),
            Self::SourcedMcqs(items) => items.iter().map(|i| i.question.clone()).collect(),
        }
    }
}

// =============================================================================
// LIBRARY
// =============================================================================

/// A note saved to the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNote {
    pub id: String,
    pub title: String,
    pub subject: Option<String>,
    pub content: String,
    /// ISO-8601 timestamp.
    pub date: String,
}

impl SavedNote {
    /// Create a note with a fresh time-ordered id and the current timestamp.
    pub fn new(title: impl Into<String>, subject: Option<String>, content: impl Into<String>) -> Self {
        Self::with_timestamp(title, subject, content, Utc::now())
    }

    pub fn with_timestamp(
        title: impl Into<String>,
        subject: Option<String>,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            subject,
            content: content.into(),
            date: at.to_rfc3339(),
        }
    }
}

/// Saved past-paper questions keyed by subject display name.
pub type SavedPastPapers = BTreeMap<String, Vec<PastPaperQuestion>>;

// =============================================================================
// PAST PAPER SEARCH
// =============================================================================

/// Topic and search phrase derived from notes before a grounded search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicContext {
    pub subject: String,
    pub topic: String,
    pub search_query: String,
}

// =============================================================================
// HURRY STUDY
// =============================================================================

/// A distinct topic identified in the user's notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurryStudyTopic {
    pub id: String,
    pub name: String,
}

/// Difficulty band of a theory question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TheoryLevel {
    Easy,
    Hard,
}

impl TheoryLevel {
    pub fn max_score(&self) -> u32 {
        match self {
            Self::Easy => crate::defaults::THEORY_EASY_MAX_SCORE,
            Self::Hard => crate::defaults::THEORY_HARD_MAX_SCORE,
        }
    }
}

/// Short-answer question grounded in the notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryQuestion {
    pub id: u32,
    pub question: String,
    #[serde(rename = "type")]
    pub level: TheoryLevel,
}

/// Examiner feedback for one answered theory question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question_id: u32,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub model_answer: String,
}

/// Graded theory test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheoryGradingResult {
    pub total_score: f64,
    pub max_total_score: f64,
    #[serde(default)]
    pub feedbacks: Vec<QuestionFeedback>,
    #[serde(default)]
    pub general_advice: String,
}

/// Rapid-fire drill: true/false plus MCQs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrillSet {
    #[serde(default)]
    pub tf: Vec<TrueFalseQuestion>,
    #[serde(default)]
    pub mcq: Vec<McqQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(answer: &str) -> McqQuestion {
        McqQuestion {
            question: "What is the unit of force?".to_string(),
            options: vec![
                "Joule".to_string(),
                "Newton".to_string(),
                "Watt".to_string(),
                "Pascal".to_string(),
            ],
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_content_kind_round_trips_through_str() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_content_kind_accepts_snake_case() {
        assert_eq!(
            "TRUE_FALSE".parse::<ContentKind>().unwrap(),
            ContentKind::TrueFalse
        );
    }

    #[test]
    fn test_content_kind_unknown() {
        let err = "essay".parse::<ContentKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_content_kind_classification() {
        assert!(ContentKind::BriefSummary.is_summary());
        assert!(ContentKind::DetailedSummary.is_summary());
        assert!(ContentKind::Mcqs.is_item_kind());
        assert!(ContentKind::Flashcards.is_item_kind());
        assert!(ContentKind::TrueFalse.is_item_kind());
        assert!(ContentKind::PastPapers.is_search_grounded());
        assert!(!ContentKind::PastPapers.is_item_kind());
    }

    #[test]
    fn test_subject_parse_by_key_and_name() {
        assert_eq!(
            "physics_p2".parse::<IgcseSubject>().unwrap(),
            IgcseSubject::PhysicsP2
        );
        assert_eq!(
            "computer science p1".parse::<IgcseSubject>().unwrap(),
            IgcseSubject::ComputerScienceP1
        );
        assert!("biology".parse::<IgcseSubject>().is_err());
    }

    #[test]
    fn test_mcq_exact_answer_is_valid() {
        let q = mcq("Newton").normalized();
        assert!(q.is_valid());
        assert_eq!(q.answer, "Newton");
    }

    #[test]
    fn test_mcq_letter_answer_maps_to_option() {
        assert_eq!(mcq("B").normalized().answer, "Newton");
        assert_eq!(mcq("(d)").normalized().answer, "Pascal");
        assert_eq!(mcq("Option C").normalized().answer, "Watt");
    }

    #[test]
    fn test_mcq_case_insensitive_answer() {
        assert_eq!(mcq(" newton ").normalized().answer, "Newton");
    }

    #[test]
    fn test_mcq_unknown_answer_is_invalid() {
        let q = mcq("Kelvin").normalized();
        assert!(!q.is_valid());
    }

    #[test]
    fn test_mcq_requires_four_options() {
        let mut q = mcq("Newton");
        q.options.pop();
        assert!(!q.is_valid());
    }

    #[test]
    fn test_generated_content_serializes_with_type_tag() {
        let content = GeneratedContent::TrueFalse(vec![TrueFalseQuestion {
            statement: "Sound travels faster in air than in steel.".to_string(),
            answer: false,
        }]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "true-false");
        assert_eq!(json["content"][0]["answer"], false);
    }

    #[test]
    fn test_generated_content_summary_deserializes() {
        let json = r#"{"type":"brief-summary","content":"Short."}"#;
        let content: GeneratedContent = serde_json::from_str(json).unwrap();
        assert_eq!(content, GeneratedContent::BriefSummary("Short.".to_string()));
        assert_eq!(content.item_count(), 1);
        assert!(content.item_texts().is_empty());
    }

    #[test]
    fn test_item_texts_for_mcqs() {
        let content = GeneratedContent::Mcqs(vec![mcq("Newton")]);
        assert_eq!(content.item_texts(), vec!["What is the unit of force?"]);
        assert_eq!(content.type_name(), "mcqs");
    }

    #[test]
    fn test_past_paper_question_camel_case() {
        let json = r#"{"question":"Define density.","answer":"Mass per unit volume.","difficulty":"easy","sourceUrl":"https://example.org/p1"}"#;
        let q: PastPaperQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.source_url.as_deref(), Some("https://example.org/p1"));
        assert!(q.image_url.is_none());
    }

    #[test]
    fn test_sourced_mcq_fields() {
        let json = r#"{"question":"Q","options":["a","b","c","d"],"answer":"A","sourcePaper":"June 2022 P1","sourceUrl":"https://placeholder.com"}"#;
        let q: SourcedMcqQuestion = serde_json::from_str(json).unwrap();
        let q = q.normalized();
        assert_eq!(q.answer, "a");
        assert!(q.is_valid());
        assert_eq!(q.source_paper, "June 2022 P1");
    }

    #[test]
    fn test_saved_note_has_v7_id_and_rfc3339_date() {
        let note = SavedNote::new("Forces", Some("Physics P2".to_string()), "F = ma");
        let id = Uuid::parse_str(&note.id).unwrap();
        assert_eq!(id.get_version_num(), 7);
        assert!(DateTime::parse_from_rfc3339(&note.date).is_ok());
    }

    #[test]
    fn test_topic_context_defaults_missing_fields() {
        let ctx: TopicContext = serde_json::from_str(r#"{"topic":"Thermal Physics"}"#).unwrap();
        assert_eq!(ctx.topic, "Thermal Physics");
        assert!(ctx.search_query.is_empty());
    }

    #[test]
    fn test_theory_question_level_serializes_as_type() {
        let q = TheoryQuestion {
            id: 5,
            question: "Explain convection.".to_string(),
            level: TheoryLevel::Hard,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "hard");
        assert_eq!(TheoryLevel::Hard.max_score(), 6);
    }
}
