use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::ConversationService;
use crate::utils::error::ApiError;

pub async fn chat_handler(
    Extension(conversation): Extension<Arc<ConversationService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(
        "Chat request: message_len={}, has_system_prompt={}",
        request.message.len(),
        request.system_prompt.is_some()
    );

    let text = conversation
        .chat_turn(request.system_prompt.as_deref(), &request.message)
        .await?;

    Ok(Json(ChatResponse { text }))
}
