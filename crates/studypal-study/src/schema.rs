//! Response schemas for structured-output calls.
//!
//! Schemas use the Gemini dialect (upper-case type names). The
//! OpenAI-compatible backend lower-cases them before sending.

use serde_json::{json, Map, Value};

fn string() -> Value {
    json!({"type": "STRING"})
}

fn array_of(items: Value) -> Value {
    json!({"type": "ARRAY", "items": items})
}

fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let props: Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({"type": "OBJECT", "properties": props, "required": required})
}

fn mcq_item() -> Value {
    object(
        &[
            ("question", string()),
            ("options", array_of(string())),
            ("answer", string()),
        ],
        &["question", "options", "answer"],
    )
}

fn true_false_item() -> Value {
    object(
        &[("statement", string()), ("answer", json!({"type": "BOOLEAN"}))],
        &["statement", "answer"],
    )
}

/// Array of four-option MCQs.
pub fn mcq_list() -> Value {
    array_of(mcq_item())
}

/// Array of true/false statements.
pub fn true_false_list() -> Value {
    array_of(true_false_item())
}

/// Array of question/answer flashcards.
pub fn flashcard_list() -> Value {
    array_of(object(
        &[("front", string()), ("back", string())],
        &["front", "back"],
    ))
}

/// Array of `{id, name}` topics.
pub fn hurry_topics() -> Value {
    array_of(object(
        &[("id", string()), ("name", string())],
        &["id", "name"],
    ))
}

/// `{easy: [{question}], hard: [{question}]}`.
pub fn theory_questions() -> Value {
    let question = array_of(object(&[("question", string())], &["question"]));
    object(
        &[("easy", question.clone()), ("hard", question)],
        &["easy", "hard"],
    )
}

/// Examiner grading result.
pub fn theory_grading() -> Value {
    let number = json!({"type": "NUMBER"});
    let feedback = object(
        &[
            ("questionId", json!({"type": "INTEGER"})),
            ("score", number.clone()),
            ("maxScore", number.clone()),
            ("feedback", string()),
            ("modelAnswer", string()),
        ],
        &["questionId", "score", "maxScore", "feedback", "modelAnswer"],
    );
    object(
        &[
            ("feedbacks", array_of(feedback)),
            ("generalAdvice", string()),
            ("totalScore", number.clone()),
            ("maxTotalScore", number),
        ],
        &["feedbacks", "generalAdvice", "totalScore", "maxTotalScore"],
    )
}

/// `{tf: [...], mcq: [...]}` drill set.
pub fn drill_set() -> Value {
    object(
        &[
            ("tf", array_of(true_false_item())),
            ("mcq", array_of(mcq_item())),
        ],
        &["tf", "mcq"],
    )
}
