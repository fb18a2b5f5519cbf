pub mod conversation;
pub mod llm_service;
pub mod voicevox;

pub use conversation::{ChatCompleter, ConversationService};
pub use llm_service::LlmService;
pub use voicevox::{SpeechSynthesizer, VoicevoxService};
