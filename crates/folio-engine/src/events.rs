//! Session event types

use serde::{Deserialize, Serialize};

use crate::actions::{DisplayPayload, SuspensionRequest};
use crate::archive::Archive;

/// Events emitted while a session plans and executes tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The executor accepted a plan
    PlanStart { task_count: usize },

    /// The plan's message for the operator
    AssistantMessage { text: String },

    /// A task is about to run
    TaskStart { index: usize, action: String },

    /// A task finished successfully
    TaskEnd { index: usize, action: String },

    /// A terminal action produced something to show
    Display {
        action: String,
        payload: DisplayPayload,
    },

    /// A downloadable archive was produced
    ArchiveReady { action: String, archive: Archive },

    /// The document list changed
    DocumentsChanged { names: Vec<String> },

    /// Execution paused waiting for operator input
    Suspended { request: SuspensionRequest },

    /// A task failed; the rest of its plan was skipped
    TaskFailed {
        index: usize,
        action: String,
        message: String,
    },

    /// Every task in the plan ran
    PlanCompleted { tasks_run: usize },

    /// Ready for the next instruction
    Ready,

    /// The response could not be read as a plan
    ParseFailed { message: String },

    /// A fragment of a streaming chat reply
    ChatDelta { delta: String },

    /// Error occurred
    Error { message: String },
}
