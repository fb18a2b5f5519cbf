//! Chat turn orchestration over the shared conversation memory.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::memory::ConversationMemory;
use crate::models::chat::{ChatMessage, Role};
use crate::utils::error::ApiError;

/// Abstraction over the chat-completion collaborator so the turn protocol
/// can be exercised without a live endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError>;
}

/// Runs the per-request chat protocol against the process-wide memory.
///
/// The mutex is never held across the outbound completion call, so two
/// concurrent requests can interleave their turns in the shared history.
/// That matches the single-global-conversation model this server exposes;
/// per-session isolation is out of scope.
pub struct ConversationService {
    memory: Mutex<ConversationMemory>,
    completer: Arc<dyn ChatCompleter>,
    default_system_prompt: String,
}

impl ConversationService {
    pub fn new(completer: Arc<dyn ChatCompleter>, default_system_prompt: String) -> Self {
        Self {
            memory: Mutex::new(ConversationMemory::new()),
            completer,
            default_system_prompt,
        }
    }

    /// One full chat turn: refresh the system prompt, record the user
    /// message, ask the model, record its reply, trim.
    ///
    /// When the completion call fails, the user message stays in history
    /// with no assistant reply and the trim is skipped for this turn.
    /// Known inconsistency, kept deliberately; see DESIGN.md before
    /// changing it.
    pub async fn chat_turn(
        &self,
        system_prompt: Option<&str>,
        message: &str,
    ) -> Result<String, ApiError> {
        let prompt = system_prompt.unwrap_or(&self.default_system_prompt);

        let context = {
            let mut memory = self.memory.lock();
            memory.apply_system_prompt(prompt);
            memory.append_turn(Role::User, message);
            memory.context()
        };

        debug!("Requesting completion with {} messages", context.len());

        let reply = self.completer.complete(context).await?;

        {
            let mut memory = self.memory.lock();
            memory.append_turn(Role::Assistant, reply.clone());
            memory.enforce_bound();
        }

        Ok(reply)
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.memory.lock().len()
    }

    #[cfg(test)]
    fn history(&self) -> Vec<ChatMessage> {
        self.memory.lock().context()
    }
}
