/// Recovery behaviour of the JSON extractor on realistic model replies.
use serde_json::json;
use studypal_core::models::{McqQuestion, TrueFalseQuestion};
use studypal_core::{extract_items, extract_json, Error};

#[test]
fn test_valid_json_fast_path() {
    let text = r#"[{"statement":"Water boils at 100 C at sea level.","answer":true}]"#;
    let value = extract_json(text).unwrap();
    assert_eq!(value, serde_json::from_str::<serde_json::Value>(text).unwrap());
}

#[test]
fn test_fenced_array() {
    let value = extract_json("```json\n[{\"a\":1}]\n```").unwrap();
    assert_eq!(value, json!([{"a": 1}]));
}

#[test]
fn test_trailing_comma_in_object() {
    let value = extract_json(r#"{"a": [1,2,],}"#).unwrap();
    assert_eq!(value, json!({"a": [1, 2]}));
}

#[test]
fn test_prose_only_reply_is_malformed() {
    let text = "I could not find any questions.";
    match extract_json(text) {
        Err(Error::MalformedResponse { raw, .. }) => assert_eq!(raw, text),
        other => panic!("expected MalformedResponse, got {:?}", other),
    }
}

#[test]
fn test_chatty_fenced_reply_with_trailing_commas() {
    let text = "Of course! Here are the questions you asked for:\n\n```json\n[\n  {\n    \"question\": \"Which quantity is a vector?\",\n    \"options\": [\"Speed\", \"Mass\", \"Velocity\", \"Time\",],\n    \"answer\": \"C\",\n  },\n]\n```\nLet me know if you need more.";
    let items: Vec<McqQuestion> = extract_items(text).unwrap();
    assert_eq!(items.len(), 1);
    let q = items.into_iter().next().unwrap().normalized();
    assert_eq!(q.answer, "Velocity");
    assert!(q.is_valid());
}

#[test]
fn test_wrapped_items_object() {
    let text = r#"{"questions": [{"statement": "Light is a transverse wave.", "answer": true}]}"#;
    let items: Vec<TrueFalseQuestion> = extract_items(text).unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].answer);
}
