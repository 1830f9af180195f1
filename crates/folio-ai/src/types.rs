//! Core types for completion-service interactions

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported API types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Api {
    GoogleGenerativeAI,
    AnthropicMessages,
}

/// Known completion-service providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Anthropic,
}

impl Provider {
    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Anthropic => "Anthropic",
        }
    }

    /// Parse a provider from its lowercase config name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" | "gemini" => Some(Provider::Google),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// The model used when none is configured
    pub fn default_model_id(&self) -> &'static str {
        match self {
            Provider::Google => "gemini-2.5-flash",
            Provider::Anthropic => "claude-sonnet-4-5-20250929",
        }
    }
}

/// Model definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub id: String,
    /// API type to use
    pub api: Api,
    /// Provider
    pub provider: Provider,
    /// Base URL for API calls
    pub base_url: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Additional headers for API calls
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Model {
    /// A Gemini model served by the Generative Language API
    pub fn gemini(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api: Api::GoogleGenerativeAI,
            provider: Provider::Google,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_tokens: 8192,
            headers: HashMap::new(),
        }
    }

    /// A Claude model served by the Anthropic Messages API
    pub fn anthropic(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api: Api::AnthropicMessages,
            provider: Provider::Anthropic,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            headers: HashMap::new(),
        }
    }

    /// Build the default model description for a provider and model id
    pub fn for_provider(provider: Provider, id: impl Into<String>) -> Self {
        match provider {
            Provider::Google => Self::gemini(id),
            Provider::Anthropic => Self::anthropic(id),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    Stop,
    /// Maximum tokens reached
    Length,
    /// Error occurred
    Error,
    /// Request was aborted
    Aborted,
}

/// Content types in messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Text content
    Text { text: String },
    /// Image content (base64 encoded)
    Image { data: String, mime_type: String },
}

impl Content {
    /// Create text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create image content from base64 data
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Create PNG image content from raw bytes
    pub fn png(bytes: &[u8]) -> Self {
        Self::image(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            "image/png",
        )
    }

    /// Get text if this is text content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Message roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// User message
    User {
        content: Vec<Content>,
        #[serde(default)]
        timestamp: i64,
    },
    /// Assistant response
    Assistant {
        content: Vec<Content>,
        #[serde(flatten)]
        metadata: AssistantMetadata,
    },
}

/// Metadata for assistant messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantMetadata {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Usage,
    pub stop_reason: Option<StopReason>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: vec![Content::text(text)],
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create a user message with multiple content blocks
    pub fn user_with_content(content: Vec<Content>) -> Self {
        Self::User {
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an assistant message holding plain text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: vec![Content::text(text)],
            metadata: AssistantMetadata {
                timestamp: chrono::Utc::now().timestamp_millis(),
                ..Default::default()
            },
        }
    }

    /// Create an empty assistant message
    pub fn assistant_empty() -> Self {
        Self::Assistant {
            content: vec![],
            metadata: AssistantMetadata {
                timestamp: chrono::Utc::now().timestamp_millis(),
                ..Default::default()
            },
        }
    }

    /// Get the role as a string
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    /// Get the content blocks
    pub fn content(&self) -> &[Content] {
        match self {
            Self::User { content, .. } => content,
            Self::Assistant { content, .. } => content,
        }
    }

    /// Get combined text content
    pub fn text(&self) -> String {
        self.content()
            .iter()
            .filter_map(|c| c.as_text())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Context for a completion request: system instruction plus prior turns
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// System instruction
    pub system_prompt: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
}

impl Context {
    /// Create a new context with a system prompt
    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            messages: vec![],
        }
    }

    /// Add a message to the context
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Clone this context with one more message appended
    pub fn with_message(&self, message: Message) -> Self {
        let mut context = self.clone();
        context.push(message);
        context
    }
}

/// Options for streaming requests
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("Gemini"), Some(Provider::Google));
        assert_eq!(Provider::parse("anthropic"), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("openai"), None);
    }

    #[test]
    fn test_message_text_joins_text_blocks() {
        let msg = Message::user_with_content(vec![
            Content::text("hello "),
            Content::png(&[1, 2, 3]),
            Content::text("world"),
        ]);
        assert_eq!(msg.text(), "hello world");
        assert_eq!(msg.role(), "user");
    }

    #[test]
    fn test_png_content_is_base64() {
        match Content::png(b"abc") {
            Content::Image { data, mime_type } => {
                assert_eq!(data, "YWJj");
                assert_eq!(mime_type, "image/png");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_context_with_message_leaves_original() {
        let ctx = Context::with_system("sys");
        let next = ctx.with_message(Message::user("hi"));
        assert!(ctx.messages.is_empty());
        assert_eq!(next.messages.len(), 1);
        assert_eq!(next.system_prompt.as_deref(), Some("sys"));
    }

    #[test]
    fn test_message_serde_tagged_by_role() {
        let msg = Message::assistant("ok");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"][0]["type"], "text");
    }
}
