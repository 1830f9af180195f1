//! Google Generative AI (Gemini) API provider

use crate::{
    error::{Error, Result},
    providers::{LlmProvider, extend_headers},
    stream::{MessageEvent, MessageEventStream},
    types::{AssistantMetadata, Content, Context, Message, Model, StopReason, StreamOptions, Usage},
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

/// Google Generative AI client
pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleProvider {
    /// Create a new Google provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    fn build_request(&self, model: &Model, context: &Context, options: &StreamOptions) -> GeminiRequest {
        let contents = context.messages.iter().filter_map(convert_message).collect();

        let system_instruction = context.system_prompt.as_ref().map(|prompt| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text {
                text: prompt.clone(),
            }],
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(options.max_tokens.unwrap_or(model.max_tokens)),
                temperature: options.temperature,
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn stream(
        &self,
        model: &Model,
        context: &Context,
        options: &StreamOptions,
    ) -> Result<MessageEventStream> {
        let request = self.build_request(model, context, options);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            model.base_url, model.id
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let key = reqwest::header::HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::InvalidApiKey)?;
        headers.insert("x-goog-api-key", key);
        extend_headers(&mut headers, &model.headers);

        tracing::debug!("Gemini API URL: {}", url);

        let request_builder = self.client.post(&url).headers(headers).json(&request);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source, model.clone())))
    }
}

fn convert_message(msg: &Message) -> Option<GeminiContent> {
    let (role, content) = match msg {
        Message::User { content, .. } => ("user", content),
        Message::Assistant { content, .. } => ("model", content),
    };

    let parts: Vec<GeminiPart> = content
        .iter()
        .map(|c| match c {
            Content::Text { text } => GeminiPart::Text { text: text.clone() },
            Content::Image { data, mime_type } => GeminiPart::InlineData {
                inline_data: GeminiBlob {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: Some(role.to_string()),
            parts,
        })
    }
}

fn create_stream(
    mut event_source: EventSource,
    model: Model,
) -> impl futures::Stream<Item = MessageEvent> {
    stream! {
        let mut accumulated_text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut usage = Usage::default();

        yield MessageEvent::Start {
            message: Message::Assistant {
                content: vec![],
                metadata: AssistantMetadata {
                    model: Some(model.id.clone()),
                    ..Default::default()
                },
            },
        };

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data.is_empty() || msg.data == "[DONE]" {
                        continue;
                    }

                    match serde_json::from_str::<GeminiStreamResponse>(&msg.data) {
                        Ok(response) => {
                            for candidate in &response.candidates {
                                if let Some(ref content) = candidate.content {
                                    for part in &content.parts {
                                        if let Some(ref text) = part.text {
                                            accumulated_text.push_str(text);
                                            yield MessageEvent::TextDelta { delta: text.clone() };
                                        }
                                    }
                                }
                                if let Some(ref reason) = candidate.finish_reason {
                                    finish_reason = Some(reason.clone());
                                }
                            }

                            if let Some(ref meta) = response.usage_metadata {
                                usage.input = meta.prompt_token_count.unwrap_or(0);
                                usage.output = meta.candidates_token_count.unwrap_or(0);
                            }
                        }
                        Err(e) => {
                            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&msg.data) {
                                yield MessageEvent::Error {
                                    message: error_response.error.message,
                                };
                                return;
                            }
                            yield MessageEvent::Error {
                                message: format!("Failed to parse chunk: {}", e),
                            };
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    yield MessageEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }
        event_source.close();

        let stop_reason = map_finish_reason(finish_reason.as_deref());

        let final_message = Message::Assistant {
            content: vec![Content::Text { text: accumulated_text }],
            metadata: AssistantMetadata {
                provider: Some(crate::Provider::Google),
                model: Some(model.id.clone()),
                usage: usage.clone(),
                stop_reason: Some(stop_reason),
                timestamp: chrono::Utc::now().timestamp_millis(),
                ..Default::default()
            },
        };

        yield MessageEvent::Done {
            message: final_message,
            stop_reason,
            usage,
        };
    }
}

fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("MAX_TOKENS") => StopReason::Length,
        _ => StopReason::Stop,
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
