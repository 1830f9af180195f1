//! The completion-service seam and its provider-backed implementation

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{Error, Result},
    providers::{LlmProvider, anthropic::AnthropicProvider, google::GoogleProvider},
    stream::{self, MessageEventStream, TextStream},
    types::{Context, Message, Model, Provider, StreamOptions},
};

/// A text-completion service.
///
/// `send` is one-shot: the whole reply is returned once complete.
/// `send_streaming` yields reply fragments as they arrive and stops when
/// `cancel` fires. Neither call mutates `context`; recording the turn is the
/// caller's job.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `message` after the turns in `context` and wait for the full reply
    async fn send(&self, context: &Context, message: Message) -> Result<String>;

    /// Send `message` after the turns in `context`, streaming the reply
    async fn send_streaming(
        &self,
        context: &Context,
        message: Message,
        cancel: CancellationToken,
    ) -> Result<TextStream>;
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculate delay for a given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_secs =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Check if an error message looks transient
fn is_retryable_message(error: &str) -> bool {
    let lower = error.to_lowercase();
    lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
        || lower.contains("overloaded")
}

/// Completion service backed by a streaming HTTP provider
pub struct ProviderService {
    model: Model,
    api_key: String,
    options: StreamOptions,
    retry_config: RetryConfig,
}

impl ProviderService {
    /// Create a service for `model` authenticated with `api_key`
    pub fn new(model: Model, api_key: impl Into<String>) -> Self {
        Self {
            model,
            api_key: api_key.into(),
            options: StreamOptions::default(),
            retry_config: RetryConfig::default(),
        }
    }

    /// Create a service reading the provider's API key from the environment
    pub fn from_env(model: Model) -> Result<Self> {
        let var = model.provider.api_key_env_var();
        let api_key = std::env::var(var)
            .or_else(|e| match model.provider {
                Provider::Google => std::env::var("GEMINI_API_KEY"),
                Provider::Anthropic => Err(e),
            })
            .map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(model, api_key))
    }

    /// Set streaming options
    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// The model this service talks to
    pub fn model(&self) -> &Model {
        &self.model
    }

    async fn open_stream(&self, context: &Context) -> Result<MessageEventStream> {
        match self.model.provider {
            Provider::Google => {
                GoogleProvider::new(self.api_key.clone())
                    .stream(&self.model, context, &self.options)
                    .await
            }
            Provider::Anthropic => {
                AnthropicProvider::new(self.api_key.clone())
                    .stream(&self.model, context, &self.options)
                    .await
            }
        }
    }

    /// Open a provider stream, retrying transient failures with backoff
    async fn open_stream_with_retry(&self, context: &Context) -> Result<MessageEventStream> {
        let mut attempt = 0u32;
        loop {
            match self.open_stream(context).await {
                Ok(s) => return Ok(s),
                Err(e) => {
                    let error_msg = e.to_string();
                    let retryable = e.is_retryable() || is_retryable_message(&error_msg);
                    if attempt < self.retry_config.max_retries && retryable {
                        let delay = self.retry_config.delay_for_attempt(attempt);
                        tracing::warn!(
                            "Completion request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt + 1,
                            self.retry_config.max_retries + 1,
                            error_msg,
                            delay
                        );
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl CompletionService for ProviderService {
    async fn send(&self, context: &Context, message: Message) -> Result<String> {
        let context = context.with_message(message);
        let mut attempt = 0u32;
        loop {
            let events = self.open_stream_with_retry(&context).await?;
            match stream::collect_text(events).await {
                Ok((text, usage)) => {
                    tracing::debug!(
                        "{} replied with {} chars ({} in / {} out tokens)",
                        self.model.id,
                        text.len(),
                        usage.input,
                        usage.output
                    );
                    if text.trim().is_empty() {
                        return Err(Error::EmptyResponse);
                    }
                    return Ok(text);
                }
                // Errors surfacing mid-stream get the same backoff as connect errors.
                Err(e)
                    if attempt < self.retry_config.max_retries
                        && (e.is_retryable() || is_retryable_message(&e.to_string())) =>
                {
                    let delay = self.retry_config.delay_for_attempt(attempt);
                    tracing::warn!("Stream failed: {}. Retrying in {:?}...", e, delay);
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_streaming(
        &self,
        context: &Context,
        message: Message,
        cancel: CancellationToken,
    ) -> Result<TextStream> {
        let context = context.with_message(message);
        let events = self.open_stream_with_retry(&context).await?;
        Ok(stream::text_fragments(events, cancel))
    }
}
