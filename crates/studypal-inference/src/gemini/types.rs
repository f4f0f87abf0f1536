//! Gemini `generateContent` request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use studypal_core::GroundingCitation;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// A conversation turn made of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A single content part. Only text parts are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Output controls.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<JsonValue>,
}

/// Tool declaration; only web-search grounding is used.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

/// Empty marker object enabling search grounding.
#[derive(Debug, Default, Serialize)]
pub struct GoogleSearch {}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Response from `generateContent`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A generated candidate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Search grounding sources attached to a candidate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

impl GroundingMetadata {
    /// Web sources with a URI, in response order.
    pub fn citations(&self) -> Vec<GroundingCitation> {
        self.grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                web.uri.as_ref().map(|uri| GroundingCitation {
                    uri: uri.clone(),
                    title: web.title.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Why a prompt was blocked before generation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiError,
}

/// Detailed error information.
#[derive(Debug, Deserialize)]
pub struct GeminiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization_plain() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("Summarize")],
            system_instruction: None,
            generation_config: None,
            tools: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Summarize");
        assert!(json.get("tools").is_none());
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_request_serialization_structured() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("Quiz me")],
            system_instruction: Some(Content::system("Be strict.")),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(json!({"type": "ARRAY"})),
            }),
            tools: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be strict.");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_request_serialization_search_tool() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("Find papers")],
            system_instruction: None,
            generation_config: None,
            tools: vec![Tool::google_search()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"], json!([{"googleSearch": {}}]));
    }

    #[test]
    fn test_response_deserialization_with_grounding() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://papers.example/p1", "title": "June 2022"}},
                        {"retrievedContext": {}},
                        {"web": {"title": "no uri"}}
                    ],
                    "webSearchQueries": ["igcse physics"]
                }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let candidate = &response.candidates[0];
        assert_eq!(
            candidate.content.as_ref().unwrap().joined_text(),
            "[{\"a\":1}]"
        );
        let citations = candidate.grounding_metadata.as_ref().unwrap().citations();
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].uri, "https://papers.example/p1");
        assert_eq!(citations[0].title.as_deref(), Some("June 2022"));
    }

    #[test]
    fn test_blocked_response_deserialization() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(response.candidates.is_empty());
        assert_eq!(
            response.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn test_error_response_deserialization() {
        let body = json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}});
        let response: GeminiErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.error.code, Some(429));
        assert_eq!(response.error.status.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }
}
