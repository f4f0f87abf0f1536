//! Plain-text rendering for terminal output.

use serde::Serialize;

use studypal_core::{
    DrillSet, GeneratedContent, HurryStudyTopic, McqQuestion, SavedNote, SavedPastPapers,
    TheoryGradingResult, TheoryLevel, TheoryQuestion,
};

/// Characters of note content shown in list views.
const LIST_PREVIEW_CHARS: usize = 80;

/// Subject listing entry for `studypal subjects`.
#[derive(Debug, Serialize)]
pub struct SubjectEntry {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChapterEntry {
    pub name: &'static str,
    pub subtopics: &'static [&'static str],
}

fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn one_line(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut short: String = flat.chars().take(max_chars).collect();
    short.push('…');
    short
}

fn mcq_block(n: usize, question: &str, options: &[String], answer: &str) -> String {
    let mut out = format!("{}. {}\n", n, question);
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("   {}) {}\n", option_letter(i), option));
    }
    out.push_str(&format!("   Answer: {}", answer));
    out
}

fn mcq_list(items: &[McqQuestion]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, q)| mcq_block(i + 1, &q.question, &q.options, &q.answer))
        .collect()
}

pub fn content(content: &GeneratedContent) -> String {
    let blocks: Vec<String> = match content {
        GeneratedContent::BriefSummary(text) | GeneratedContent::DetailedSummary(text) => {
            return text.clone()
        }
        GeneratedContent::Flashcards(items) => items
            .iter()
            .enumerate()
            .map(|(i, card)| format!("{}. Q: {}\n   A: {}", i + 1, card.front, card.back))
            .collect(),
        GeneratedContent::Mcqs(items) => mcq_list(items),
        GeneratedContent::TrueFalse(items) => items
            .iter()
            .enumerate()
            .map(|(i, q)| {
                format!(
                    "{}. {}\n   Answer: {}",
                    i + 1,
                    q.statement,
                    if q.answer { "True" } else { "False" }
                )
            })
            .collect(),
        GeneratedContent::PastPapers(items) => items
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let mut block = format!("{}. [{}] {}\n   Answer: {}", i + 1, q.difficulty, q.question, q.answer);
                if let Some(url) = &q.source_url {
                    block.push_str(&format!("\n   Source: {}", url));
                }
                block
            })
            .collect(),
        GeneratedContent::SourcedMcqs(items) => items
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let mut block = mcq_block(i + 1, &q.question, &q.options, &q.answer);
                if !q.source_paper.is_empty() {
                    block.push_str(&format!("\n   Paper: {}", q.source_paper));
                }
                if !q.source_url.is_empty() {
                    block.push_str(&format!("\n   Source: {}", q.source_url));
                }
                block
            })
            .collect(),
    };
    if blocks.is_empty() {
        return format!("No {} were generated.", content.type_name().replace('-', " "));
    }
    blocks.join("\n\n")
}

pub fn parts(parts: &[String]) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            format!(
                "Part {} ({} chars): {}",
                i + 1,
                part.chars().count(),
                one_line(part, LIST_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn topics(topics: &[HurryStudyTopic]) -> String {
    topics
        .iter()
        .map(|t| format!("[{}] {}", t.id, t.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn theory_questions(questions: &[TheoryQuestion]) -> String {
    questions
        .iter()
        .map(|q| {
            let label = match q.level {
                TheoryLevel::Easy => "easy",
                TheoryLevel::Hard => "hard",
            };
            format!("Q{} ({}, {} marks): {}", q.id, label, q.level.max_score(), q.question)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn grading(result: &TheoryGradingResult) -> String {
    let mut out = format!("Score: {} / {}\n", result.total_score, result.max_total_score);
    for f in &result.feedbacks {
        out.push_str(&format!(
            "\nQ{}: {} / {}\n   Feedback: {}\n   Model answer: {}\n",
            f.question_id, f.score, f.max_score, f.feedback, f.model_answer
        ));
    }
    if !result.general_advice.is_empty() {
        out.push_str(&format!("\nAdvice: {}", result.general_advice));
    }
    out.trim_end().to_string()
}

pub fn drill(set: &DrillSet) -> String {
    let mut blocks = Vec::new();
    if !set.tf.is_empty() {
        let tf: Vec<String> = set
            .tf
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {} ({})", i + 1, q.statement, if q.answer { "True" } else { "False" }))
            .collect();
        blocks.push(format!("True or false:\n{}", tf.join("\n")));
    }
    if !set.mcq.is_empty() {
        blocks.push(format!("Multiple choice:\n{}", mcq_list(&set.mcq).join("\n")));
    }
    blocks.join("\n\n")
}

pub fn saved_note(note: &SavedNote) -> String {
    format!("Saved note {} \"{}\"", note.id, note.title)
}

pub fn note_list(notes: &[SavedNote]) -> String {
    if notes.is_empty() {
        return "No saved notes.".to_string();
    }
    notes
        .iter()
        .map(|n| {
            let subject = n.subject.as_deref().map(|s| format!(" [{}]", s)).unwrap_or_default();
            format!("{}  {}  {}{}", n.id, n.date, n.title, subject)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn papers(papers: &SavedPastPapers) -> String {
    if papers.values().all(|items| items.is_empty()) {
        return "No saved past paper questions.".to_string();
    }
    papers
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(subject, items)| {
            let body = content(&GeneratedContent::PastPapers(items.clone()));
            format!("== {} ({}) ==\n{}", subject, items.len(), body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn subjects(entries: &[SubjectEntry]) -> String {
    entries
        .iter()
        .map(|s| {
            let mut line = format!("{:<16} {}", s.key, s.name);
            for chapter in &s.chapters {
                line.push_str(&format!("\n    - {}", chapter.name));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
