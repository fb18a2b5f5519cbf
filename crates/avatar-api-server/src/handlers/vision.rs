use axum::{
    extract::{Extension, Multipart},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::ChatResponse;
use crate::services::LlmService;
use crate::utils::error::ApiError;

pub async fn vision_handler(
    Extension(llm_service): Extension<Arc<LlmService>>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("Vision request received");

    let mut file_data: Option<Vec<u8>> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::BadRequest("file required".to_string()))?;

    info!("Analyzing uploaded image ({} bytes)", file_data.len());

    let text = llm_service.describe_image(&file_data).await?;

    Ok(Json(ChatResponse { text }))
}
