//! Per-operator editing session state

use crate::conversation::ConversationState;
use crate::document::DocumentSet;
use crate::executor::TaskExecutor;

/// Everything one operator's session owns. Only the adapter mutates it.
pub struct EditingSession {
    pub documents: DocumentSet,
    /// Created lazily on the first document or message
    pub conversation: Option<ConversationState>,
    pub executor: TaskExecutor,
}

impl EditingSession {
    pub fn new(executor: TaskExecutor) -> Self {
        Self {
            documents: DocumentSet::new(),
            conversation: None,
            executor,
        }
    }

    /// The conversation, started with `system_prompt` if there is none yet
    pub fn conversation_or_start(&mut self, system_prompt: impl FnOnce() -> String) -> &mut ConversationState {
        self.conversation
            .get_or_insert_with(|| ConversationState::new(system_prompt()))
    }

    /// Discard documents, conversation and any pending suspension
    pub fn reset(&mut self) {
        self.documents.clear();
        self.conversation = None;
        self.executor.reset();
    }
}
