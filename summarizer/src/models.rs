use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which side of the exchange authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Driver,
    Responder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn driver(content: impl Into<String>) -> Self {
        Self {
            role: Role::Driver,
            content: content.into(),
        }
    }

    pub fn responder(content: impl Into<String>) -> Self {
        Self {
            role: Role::Responder,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The latest reply ended with the termination sentinel.
    Sentinel,
    /// The driver used up its auto-reply budget.
    AutoReplyLimit,
}

/// Outcome of one driver -> responder exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    pub history: Vec<ChatTurn>,
    pub termination: TerminationReason,
}

/// What the responder sends to the model for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub turns: Vec<ChatTurn>,
    pub max_output_tokens: Option<u32>,
    pub seed: Option<i64>,
}

/// An upload persisted under an opaque name.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: String,
    pub original_filename: String,
    pub path: PathBuf,
}

// Gemini generateContent wire types.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
