pub mod chat;
pub mod health;
pub mod tts;
pub mod vision;
