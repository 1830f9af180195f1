//! Completion-service provider implementations

pub mod anthropic;
pub mod google;

use crate::{Context, MessageEventStream, Model, Result, StreamOptions};
use async_trait::async_trait;

/// Trait for streaming providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream a response for the given context
    async fn stream(
        &self,
        model: &Model,
        context: &Context,
        options: &StreamOptions,
    ) -> Result<MessageEventStream>;
}

/// Insert model-specific headers, skipping any that are not valid HTTP headers
pub(crate) fn extend_headers(
    headers: &mut reqwest::header::HeaderMap,
    extra: &std::collections::HashMap<String, String>,
) {
    for (key, value) in extra {
        if let (Ok(name), Ok(val)) = (
            key.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            headers.insert(name, val);
        }
    }
}
