use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::config::VoicevoxConfig;
use crate::utils::error::ApiError;

/// Abstraction over the speech-synthesis collaborator so the handlers can
/// be exercised without a running engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ApiError>;

    /// Liveness probe for the engine.
    async fn ping(&self) -> Result<(), ApiError>;
}

/// Client for the local VOICEVOX engine.
///
/// Synthesis is a two-step call: `audio_query` turns text into a synthesis
/// recipe, `synthesis` renders that recipe into WAV bytes. A failure at
/// either step surfaces as one [`ApiError::TtsError`].
#[derive(Clone)]
pub struct VoicevoxService {
    client: Client,
    config: VoicevoxConfig,
}

impl VoicevoxService {
    pub fn new(config: VoicevoxConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Step 1: build the synthesis recipe for the given text.
    ///
    /// The recipe is engine-internal and passed back verbatim, so it stays
    /// an opaque JSON value here.
    async fn audio_query(&self, text: &str) -> Result<serde_json::Value, ApiError> {
        debug!("VOICEVOX audio_query: text_chars={}", text.chars().count());

        let speaker = self.config.speaker_id.to_string();

        let response = self
            .client
            .post(format!("{}/audio_query", self.config.base_url))
            .query(&[("text", text), ("speaker", speaker.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::TtsError(format!("Failed to call audio_query: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::TtsError(format!(
                "audio_query error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::TtsError(format!("Failed to parse audio_query: {}", e)))
    }

    /// Step 2: render the recipe into audio/wav bytes.
    async fn synthesis(&self, query: &serde_json::Value) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .post(format!("{}/synthesis", self.config.base_url))
            .query(&[("speaker", self.config.speaker_id)])
            .json(query)
            .send()
            .await
            .map_err(|e| ApiError::TtsError(format!("Failed to call synthesis: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::TtsError(format!(
                "synthesis error: {} - {}",
                status, body
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ApiError::TtsError(format!("Failed to read synthesis audio: {}", e)))
    }
}

#[async_trait]
impl SpeechSynthesizer for VoicevoxService {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ApiError> {
        let query = self.audio_query(text).await?;
        self.synthesis(&query).await
    }

    async fn ping(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .get(format!("{}/version", self.config.base_url))
            .send()
            .await
            .map_err(|e| ApiError::TtsError(format!("Failed to reach VOICEVOX: {}", e)))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::TtsError(format!("VOICEVOX not ready: {}", e)))?;

        Ok(())
    }
}
