//! Chat completions wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Body of `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    /// Null for tool-call replies, which studypal never requests.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `response_format` values; schemas go out as `json_schema`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
    JsonSchema { json_schema: JsonSchemaSpec },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub schema: JsonValue,
}

/// The parts of a completion studypal reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// String on OpenAI, numeric on some compatible servers.
    #[serde(default)]
    pub code: Option<JsonValue>,
}

/// Convert a Gemini-style response schema (upper-case `type` names) into
/// JSON Schema with lower-case type names.
pub fn to_json_schema(schema: &JsonValue) -> JsonValue {
    match schema {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", JsonValue::String(t)) => JsonValue::String(t.to_lowercase()),
                        _ => to_json_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_unset_options() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage::new("system", "You are an examiner."),
                ChatMessage::new("user", "Hello"),
            ],
            temperature: None,
            response_format: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json.get("response_format").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn json_object_format_shape() {
        let json = serde_json::to_value(ResponseFormat::JsonObject).unwrap();
        assert_eq!(json, json!({"type": "json_object"}));
    }

    #[test]
    fn json_schema_format_shape() {
        let format = ResponseFormat::JsonSchema {
            json_schema: JsonSchemaSpec {
                name: "response".to_string(),
                schema: json!({"type": "array"}),
            },
        };
        let json = serde_json::to_value(format).unwrap();
        assert_eq!(json["type"], "json_schema");
        assert_eq!(json["json_schema"]["name"], "response");
        assert_eq!(json["json_schema"]["schema"]["type"], "array");
    }

    #[test]
    fn completion_ignores_unknown_fields_and_null_content() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": null}, "finish_reason": "tool_calls"},
                {"index": 1, "message": {"role": "assistant", "content": "Hi"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 5, "completion_tokens": 1, "total_tokens": 6}
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "");
        assert_eq!(response.choices[1].message.content, "Hi");
        assert_eq!(response.choices[1].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn gemini_schema_types_are_lowercased() {
        let schema = json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "statement": {"type": "STRING", "description": "Keep TYPE text"},
                    "answer": {"type": "BOOLEAN"}
                },
                "required": ["statement", "answer"]
            }
        });
        let converted = to_json_schema(&schema);
        assert_eq!(converted["type"], "array");
        assert_eq!(converted["items"]["type"], "object");
        assert_eq!(converted["items"]["properties"]["answer"]["type"], "boolean");
        assert_eq!(
            converted["items"]["properties"]["statement"]["description"],
            "Keep TYPE text"
        );
        assert_eq!(converted["items"]["required"], json!(["statement", "answer"]));
    }
}
