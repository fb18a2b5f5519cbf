use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::services::SpeechSynthesizer;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Ready only when the local VOICEVOX engine answers; the LLM side is a
/// remote API and not probed here.
pub async fn readiness_check(
    Extension(synthesizer): Extension<Arc<dyn SpeechSynthesizer>>,
) -> StatusCode {
    match synthesizer.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::voicevox::MockSpeechSynthesizer;
    use crate::utils::error::ApiError;

    #[tokio::test]
    async fn ready_when_engine_answers() {
        let mut mock = MockSpeechSynthesizer::new();
        mock.expect_ping().returning(|| Ok(()));

        let status =
            readiness_check(Extension(Arc::new(mock) as Arc<dyn SpeechSynthesizer>)).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unavailable_when_engine_is_down() {
        let mut mock = MockSpeechSynthesizer::new();
        mock.expect_ping()
            .returning(|| Err(ApiError::TtsError("engine down".to_string())));

        let status =
            readiness_check(Extension(Arc::new(mock) as Arc<dyn SpeechSynthesizer>)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
