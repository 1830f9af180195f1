//! folio-engine: AI-directed PDF task orchestration
//!
//! This crate turns operator instructions into plans via a completion
//! service, repairs and validates them, and executes their tasks in order
//! against a set of loaded documents, pausing when the plan needs input.

pub mod actions;
pub mod adapter;
pub mod archive;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod events;
pub mod executor;
pub mod params;
pub mod parser;
pub mod plan;
pub mod position;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod testing;

pub use actions::{DisplayPayload, RequestKind, SuspensionRequest, Table};
pub use adapter::{ConversationAdapter, Outline, OutlineSection, Recommendation, TurnOutcome};
pub use archive::Archive;
pub use catalog::{ActionKind, Catalog, EffectClass};
pub use chat::{ChatAccumulator, ChatOutcome, ChatReply};
pub use config::EngineConfig;
pub use conversation::ConversationState;
pub use document::{Document, DocumentLibrary, DocumentSet, PdfDocument, Rasterizer};
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use executor::{ExecutorState, PendingSuspension, RunReport, RunStatus, TaskExecutor};
pub use parser::parse_json;
pub use plan::{Plan, Task, TaskAction};
pub use position::Anchor;
pub use session::EditingSession;
