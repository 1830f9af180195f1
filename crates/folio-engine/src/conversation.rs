//! Conversation state: the completion-service context for one editing session.

use chrono::{DateTime, Utc};
use folio_ai::{Context, Message};
use uuid::Uuid;

/// The system instruction plus every turn exchanged so far.
///
/// Only the adapter appends turns, one user/assistant pair at a time.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub context: Context,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            context: Context::with_system(system_prompt),
        }
    }

    /// Record a completed exchange
    pub fn record(&mut self, user: Message, reply: impl Into<String>) {
        self.context.push(user);
        self.context.push(Message::assistant(reply));
    }

    /// Number of completed exchanges
    pub fn turns(&self) -> usize {
        self.context.messages.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_pairs() {
        let mut state = ConversationState::new("plan things");
        assert_eq!(state.turns(), 0);
        state.record(Message::user("rotate it"), "{\"tasks\":[]}");
        assert_eq!(state.turns(), 1);
        assert_eq!(state.context.messages[0].role(), "user");
        assert_eq!(state.context.messages[1].text(), "{\"tasks\":[]}");
        assert_eq!(state.context.system_prompt.as_deref(), Some("plan things"));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ConversationState::new("a").id, ConversationState::new("a").id);
    }
}
