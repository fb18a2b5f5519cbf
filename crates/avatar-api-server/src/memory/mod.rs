//! Bounded conversation memory.
//!
//! One process-wide turn history shared by every chat request. There is no
//! per-session partitioning: all callers talk to the same conversation, and
//! the buffer resets only when the process restarts.

use crate::models::chat::{ChatMessage, Role};

/// Conversational turns kept after a trim (the system message is exempt).
const MAX_HISTORY: usize = 10;

/// Total bound: 1 system message + `MAX_HISTORY` conversational turns.
const MAX_MESSAGES: usize = MAX_HISTORY + 1;

/// Ordered turn history handed to the language model as prompt context.
///
/// Invariants after any mutation:
/// - if non-empty, element 0 is the most recent system message, and only a
///   system message ever occupies position 0;
/// - `len() <= MAX_MESSAGES` once [`enforce_bound`](Self::enforce_bound)
///   has run.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    messages: Vec<ChatMessage>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self {
            messages: Vec::with_capacity(MAX_MESSAGES),
        }
    }

    /// Refresh the system prompt to the latest caller-supplied value.
    ///
    /// An empty buffer (or one whose head is not a system message) gets a
    /// new system message inserted at position 0; otherwise the existing
    /// head is overwritten unconditionally, even mid-conversation.
    pub fn apply_system_prompt(&mut self, prompt: &str) {
        match self.messages.first_mut() {
            Some(head) if head.role == Role::System => {
                head.content = prompt.to_string();
            }
            _ => self
                .messages
                .insert(0, ChatMessage::new(Role::System, prompt)),
        }
    }

    /// Append one turn to the end of the history.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// Trim to `[system message] + newest MAX_HISTORY turns`.
    ///
    /// FIFO eviction: the oldest conversational turns are discarded first,
    /// the system message at position 0 is always kept.
    pub fn enforce_bound(&mut self) {
        if self.messages.len() > MAX_MESSAGES {
            let tail_start = self.messages.len() - MAX_HISTORY;
            let mut trimmed = Vec::with_capacity(MAX_MESSAGES);
            trimmed.push(self.messages[0].clone());
            trimmed.extend_from_slice(&self.messages[tail_start..]);
            self.messages = trimmed;
        }
    }

    /// Snapshot of the full history, in the shape the LLM API expects.
    pub fn context(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(turns: usize) -> ConversationMemory {
        let mut memory = ConversationMemory::new();
        memory.apply_system_prompt("base");
        for i in 0..turns {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            memory.append_turn(role, format!("turn-{}", i));
        }
        memory
    }

    #[test]
    fn system_prompt_inserted_into_empty_buffer() {
        let mut memory = ConversationMemory::new();
        memory.apply_system_prompt("P1");

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.messages()[0], ChatMessage::new(Role::System, "P1"));
    }

    #[test]
    fn system_prompt_refreshed_in_place() {
        let mut memory = filled(2);
        memory.apply_system_prompt("updated");

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.messages()[0].role, Role::System);
        assert_eq!(memory.messages()[0].content, "updated");
    }

    #[test]
    fn system_prompt_is_idempotent() {
        let mut once = ConversationMemory::new();
        once.apply_system_prompt("P1");

        let mut twice = ConversationMemory::new();
        twice.apply_system_prompt("P1");
        twice.apply_system_prompt("P1");

        assert_eq!(once.messages(), twice.messages());
    }

    #[test]
    fn system_prompt_inserted_before_existing_turns() {
        let mut memory = ConversationMemory::new();
        memory.append_turn(Role::User, "hi");
        memory.apply_system_prompt("P1");

        assert_eq!(memory.messages()[0].role, Role::System);
        assert_eq!(memory.messages()[1], ChatMessage::new(Role::User, "hi"));
    }

    #[test]
    fn turn_sequence_builds_ordered_history() {
        let mut memory = ConversationMemory::new();
        memory.apply_system_prompt("P1");
        memory.append_turn(Role::User, "hi");

        assert_eq!(
            memory.messages(),
            &[
                ChatMessage::new(Role::System, "P1"),
                ChatMessage::new(Role::User, "hi"),
            ]
        );

        memory.append_turn(Role::Assistant, "hello");

        assert_eq!(
            memory.messages(),
            &[
                ChatMessage::new(Role::System, "P1"),
                ChatMessage::new(Role::User, "hi"),
                ChatMessage::new(Role::Assistant, "hello"),
            ]
        );
    }

    #[test]
    fn enforce_bound_is_noop_at_the_limit() {
        let mut memory = filled(10);
        memory.enforce_bound();

        assert_eq!(memory.len(), 11);
        assert_eq!(memory.messages()[1].content, "turn-0");
    }

    #[test]
    fn enforce_bound_drops_oldest_conversational_turns() {
        let mut memory = filled(12);
        assert_eq!(memory.len(), 13);

        memory.enforce_bound();

        assert_eq!(memory.len(), 11);
        assert_eq!(memory.messages()[0].role, Role::System);
        // turn-0 and turn-1 evicted, newest 10 kept in order
        assert_eq!(memory.messages()[1].content, "turn-2");
        assert_eq!(memory.messages()[10].content, "turn-11");
    }

    #[test]
    fn head_stays_system_across_mutations() {
        let mut memory = ConversationMemory::new();
        for i in 0..30 {
            memory.apply_system_prompt("base");
            memory.append_turn(Role::User, format!("q{}", i));
            memory.append_turn(Role::Assistant, format!("a{}", i));
            memory.enforce_bound();

            assert!(memory.len() <= 11);
            assert_eq!(memory.messages()[0].role, Role::System);
        }
    }
}
