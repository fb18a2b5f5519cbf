use serde::{Deserialize, Serialize};

// ===== CHAT MESSAGE =====

/// Message role accepted by the OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversational turn, shaped exactly like the wire payload
/// the chat-completions endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Falls back to the configured default prompt when omitted.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

// ===== RESPONSE MODELS =====

/// Shared by `/api/chat` and `/api/vision`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}
