use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub voicevox: VoicevoxConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (OpenRouter).
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub chat_max_tokens: usize,
    pub vision_max_tokens: usize,
    pub timeout_seconds: u64,
    /// Sent as HTTP-Referer; OpenRouter uses it for app attribution.
    pub referer: String,
    /// Sent as X-Title.
    pub app_title: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VoicevoxConfig {
    pub base_url: String,
    pub speaker_id: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub default_system_prompt: String,
    pub vision_prompt: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// The OpenRouter key never lives in the settings file. Missing key is
    /// a fatal startup condition.
    pub fn api_key() -> Result<String> {
        std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY not found in environment or .env file")
    }
}
