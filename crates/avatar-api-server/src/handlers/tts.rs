use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::services::SpeechSynthesizer;

#[derive(Debug, Deserialize)]
pub struct TtsParams {
    pub text: String,
}

pub async fn tts_handler(
    Extension(synthesizer): Extension<Arc<dyn SpeechSynthesizer>>,
    Query(params): Query<TtsParams>,
) -> Response {
    info!("TTS request: text_chars={}", params.text.chars().count());

    match synthesizer.synthesize(&params.text).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/wav")], audio).into_response(),
        Err(e) => {
            error!("Voicevox error: {}", e);
            // The front end only checks the status here; the body stays empty.
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
