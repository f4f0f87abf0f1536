//! Tolerant recovery of JSON values from model output.
//!
//! Models asked for JSON still wrap it in prose, code fences or leave
//! trailing commas behind. [`extract_json`] applies a fixed ladder of
//! strategies and stops at the first that parses:
//!
//! 1. parse the text as-is;
//! 2. strip code-fence markers (```` ``` ```` with an optional language tag);
//! 3. slice from the first `[` or `{` to the last matching closer;
//! 4. remove trailing commas before `]` / `}` in that slice.
//!
//! When all fail the caller gets [`Error::MalformedResponse`] with the raw
//! text attached.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Error, Result};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("valid regex"));
static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[\]}])").expect("valid regex"));

/// Recover a JSON value from noisy model text.
pub fn extract_json(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let unfenced = CODE_FENCE.replace_all(text, "");
    let unfenced = unfenced.trim();
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        trace!(strategy = "strip_fences", "Recovered JSON");
        return Ok(value);
    }

    let Some(slice) = bracket_slice(unfenced) else {
        return Err(Error::malformed("no JSON value found in response", text));
    };
    if let Ok(value) = serde_json::from_str::<Value>(slice) {
        trace!(strategy = "bracket_slice", "Recovered JSON");
        return Ok(value);
    }

    let repaired = TRAILING_COMMA.replace_all(slice, "$1");
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            trace!(strategy = "trailing_commas", "Recovered JSON");
            Ok(value)
        }
        Err(e) => Err(Error::malformed(
            format!("could not parse JSON from response: {}", e),
            text,
        )),
    }
}

/// Slice from the first opener to the last closer of the same kind.
fn bracket_slice(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Recover JSON and deserialize it into `T`.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = extract_json(text)?;
    serde_json::from_value(value)
        .map_err(|e| Error::malformed(format!("response did not match expected shape: {}", e), text))
}

/// Recover a list of items.
///
/// Accepts a bare array, an object wrapping an array of objects
/// (`{"questions": [...]}`), or a single bare object treated as a
/// one-element list. An object whose only array holds scalars, such as an
/// MCQ with its `options`, is an item rather than a wrapper. Elements that do not deserialize are dropped with a
/// warning; a non-empty list where every element fails is malformed.
pub fn extract_items<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let value = extract_json(text)?;
    let elements = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let wrapped = wrapped_list(&map).cloned();
            wrapped.unwrap_or_else(|| vec![Value::Object(map)])
        }
        other => {
            return Err(Error::malformed(
                format!("expected a list of items, got {}", json_type(&other)),
                text,
            ))
        }
    };

    let total = elements.len();
    let mut items = Vec::with_capacity(total);
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(item) => items.push(item),
            Err(e) => warn!(index, error = %e, "Dropping item that does not match expected shape"),
        }
    }

    if total > 0 && items.is_empty() {
        return Err(Error::malformed(
            "no item in the response matched the expected shape",
            text,
        ));
    }
    Ok(items)
}

/// The lone array field of an object, when it holds only objects.
fn wrapped_list(map: &serde_json::Map<String, Value>) -> Option<&Vec<Value>> {
    let mut arrays = map.values().filter_map(Value::as_array);
    let items = arrays.next()?;
    if arrays.next().is_some() || !items.iter().all(Value::is_object) {
        return None;
    }
    Some(items)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Card {
        front: String,
        back: String,
    }

    #[test]
    fn test_direct_parse() {
        assert_eq!(extract_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_with_language_tag() {
        let text = "```json\n[{\"a\":1}]\n```";
        assert_eq!(extract_json(text).unwrap(), json!([{"a": 1}]));
    }

    #[test]
    fn test_fenced_without_language_tag() {
        let text = "```\n{\"ok\": true}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_prose_around_json() {
        let text = "Here are your questions:\n[{\"a\": 1}, {\"a\": 2}]\nGood luck!";
        assert_eq!(extract_json(text).unwrap(), json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn test_trailing_commas_repaired() {
        let text = "Sure! {\"a\": [1, 2,], }";
        assert_eq!(extract_json(text).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_array_opener_uses_last_bracket() {
        let text = "list: [{\"a\": 1}] trailing } brace";
        assert_eq!(extract_json(text).unwrap(), json!([{"a": 1}]));
    }

    #[test]
    fn test_no_json_is_malformed_with_raw() {
        let text = "I could not find any questions.";
        let err = extract_json(text).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert_eq!(err.raw_response(), Some(text));
    }

    #[test]
    fn test_closer_before_opener_is_malformed() {
        assert!(extract_json("} nothing {").is_err());
    }

    #[test]
    fn test_unrepairable_is_malformed() {
        let err = extract_json("{\"a\": tru").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_extract_as_shape_mismatch() {
        let err = extract_as::<Card>(r#"{"front": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_extract_items_bare_array() {
        let cards: Vec<Card> = extract_items(r#"[{"front":"a","back":"b"}]"#).unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_extract_items_wrapped_array() {
        let text = r#"{"flashcards": [{"front":"a","back":"b"},{"front":"c","back":"d"}]}"#;
        let cards: Vec<Card> = extract_items(text).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].front, "c");
    }

    #[test]
    fn test_extract_items_single_object() {
        let cards: Vec<Card> = extract_items(r#"{"front":"a","back":"b"}"#).unwrap();
        assert_eq!(
            cards,
            vec![Card {
                front: "a".to_string(),
                back: "b".to_string()
            }]
        );
    }

    #[derive(Debug, Deserialize)]
    struct Choice {
        question: String,
        options: Vec<String>,
        answer: String,
    }

    #[test]
    fn test_extract_items_single_object_with_scalar_array() {
        let text = r#"{"question":"Unit of force?","options":["Newton","Joule","Watt","Pascal"],"answer":"Newton"}"#;
        let items: Vec<Choice> = extract_items(text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "Unit of force?");
        assert_eq!(items[0].options.len(), 4);
        assert_eq!(items[0].answer, "Newton");
    }

    #[test]
    fn test_extract_items_empty_wrapper_is_empty_list() {
        let cards: Vec<Card> = extract_items(r#"{"flashcards": []}"#).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_extract_items_drops_bad_elements() {
        let text = r#"[{"front":"a","back":"b"},{"front":"only"}]"#;
        let cards: Vec<Card> = extract_items(text).unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_extract_items_all_bad_is_malformed() {
        let err = extract_items::<Card>(r#"[{"x":1},{"y":2}]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_extract_items_empty_array_is_ok() {
        let cards: Vec<Card> = extract_items("[]").unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_extract_items_rejects_scalar() {
        assert!(extract_items::<Card>("42").is_err());
    }
}
