use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::models::chat::ChatMessage;
use crate::services::conversation::ChatCompleter;
use crate::utils::error::ApiError;

// ===== REQUEST PAYLOADS =====

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct VisionCompletionRequest {
    model: String,
    messages: Vec<VisionMessage>,
    max_tokens: usize,
}

/// Vision messages carry a content array instead of a plain string.
#[derive(Debug, Serialize)]
struct VisionMessage {
    role: &'static str,
    content: Vec<VisionPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum VisionPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

// ===== RESPONSE PAYLOADS =====

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the OpenAI-compatible chat-completions endpoint (OpenRouter).
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
    api_key: String,
    vision_prompt: String,
}

impl LlmService {
    pub fn new(config: LlmConfig, api_key: String, vision_prompt: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build()
                .expect("Failed to create HTTP client"),
            config,
            api_key,
            vision_prompt,
        }
    }

    /// Generate one reply for the given conversation history.
    pub async fn generate_chat(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError> {
        debug!("Chat completion with {} messages", messages.len());

        let request = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            max_tokens: self.config.chat_max_tokens,
        };

        let response = self
            .post_completions(&request)
            .await?;

        self.extract_reply(response).await
    }

    /// Describe one image: the instruction prompt plus the image inlined
    /// as a base64 data URL, sent to the vision-capable model.
    pub async fn describe_image(&self, image: &[u8]) -> Result<String, ApiError> {
        debug!("Vision completion for {} image bytes", image.len());

        let encoded = base64::engine::general_purpose::STANDARD.encode(image);

        let request = VisionCompletionRequest {
            model: self.config.vision_model.clone(),
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    VisionPart::Text {
                        text: self.vision_prompt.clone(),
                    },
                    VisionPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", encoded),
                        },
                    },
                ],
            }],
            max_tokens: self.config.vision_max_tokens,
        };

        let response = self
            .post_completions(&request)
            .await?;

        self.extract_reply(response).await
    }

    async fn post_completions<T: Serialize + ?Sized>(
        &self,
        request: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to call LLM API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmError(format!(
                "LLM API error: {} - {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn extract_reply(&self, response: reqwest::Response) -> Result<String, ApiError> {
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to parse LLM response: {}", e)))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ApiError::LlmError("No choices returned from LLM".to_string()))
    }
}

#[async_trait]
impl ChatCompleter for LlmService {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError> {
        self.generate_chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn chat_request_serializes_to_openai_shape() {
        let request = ChatCompletionRequest {
            model: "moonshotai/kimi-k2-0905".to_string(),
            messages: vec![
                ChatMessage::new(Role::System, "P1"),
                ChatMessage::new(Role::User, "hi"),
            ],
            max_tokens: 200,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "moonshotai/kimi-k2-0905");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn vision_request_inlines_image_as_data_url() {
        let request = VisionCompletionRequest {
            model: "google/gemma-3-27b-it".to_string(),
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    VisionPart::Text {
                        text: "describe".to_string(),
                    },
                    VisionPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,aGk=".to_string(),
                        },
                    },
                ],
            }],
            max_tokens: 100,
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn reply_extraction_shape_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hello");
    }
}
