use serde::{Deserialize, Serialize};

// Requests

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub payload: Option<GenerationPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationPayload {
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub parts: Vec<RequestPart>,
}

/// A single request fragment. Exactly one of the fields is expected to be set;
/// `translate` enforces that.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineDataPart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPart {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

// Responses

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

/// Fixed single-candidate, single-part response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseCandidate {
    pub content: ResponseContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseContent {
    pub parts: Vec<TextPart>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextPart {
    pub text: String,
}

impl GenerationResponse {
    pub fn from_text(text: String) -> Self {
        Self {
            candidates: vec![ResponseCandidate {
                content: ResponseContent {
                    parts: vec![TextPart { text }],
                    role: "model".to_string(),
                },
            }],
        }
    }
}
