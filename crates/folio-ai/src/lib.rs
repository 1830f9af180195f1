//! folio-ai: Text-completion service abstraction
//!
//! This crate provides the message model, the [`CompletionService`] trait the
//! orchestration engine talks to, and streaming providers for Google Gemini
//! and Anthropic Claude.

pub mod error;
pub mod providers;
pub mod service;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use service::{CompletionService, ProviderService, RetryConfig};
pub use stream::{MessageEventStream, TextStream};
pub use types::*;
