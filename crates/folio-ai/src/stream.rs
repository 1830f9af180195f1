//! Streaming event types and utilities

use crate::error::{Error, Result};
use crate::types::{Message, StopReason, Usage};
use async_stream::stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

/// Events emitted while a provider streams a response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// Initial message structure
    Start { message: Message },
    /// Text content delta
    TextDelta { delta: String },
    /// Message completed successfully
    Done {
        message: Message,
        stop_reason: StopReason,
        usage: Usage,
    },
    /// Error occurred
    Error { message: String },
}

impl MessageEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageEvent::Done { .. } | MessageEvent::Error { .. })
    }
}

/// A stream of provider message events
pub type MessageEventStream = Pin<Box<dyn Stream<Item = MessageEvent> + Send>>;

/// A stream of response text fragments
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Builder for an assistant message assembled from streaming events
#[derive(Debug, Default)]
pub struct MessageBuilder {
    text: String,
    usage: Usage,
    stop_reason: Option<StopReason>,
    error: Option<String>,
}

impl MessageBuilder {
    /// Create a new message builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a streaming event and update the message state
    pub fn process_event(&mut self, event: &MessageEvent) {
        match event {
            MessageEvent::TextDelta { delta } => self.text.push_str(delta),
            MessageEvent::Done {
                message,
                stop_reason,
                usage,
            } => {
                // Providers report the authoritative final text on Done.
                let final_text = message.text();
                if !final_text.is_empty() {
                    self.text = final_text;
                }
                self.stop_reason = Some(*stop_reason);
                self.usage = usage.clone();
            }
            MessageEvent::Error { message } => self.error = Some(message.clone()),
            MessageEvent::Start { .. } => {}
        }
    }

    /// Finish building, surfacing a stream error if one was seen
    pub fn finish(self) -> Result<(String, Usage)> {
        if let Some(message) = self.error {
            return Err(Error::Sse(message));
        }
        if self.stop_reason.is_none() {
            return Err(Error::UnexpectedResponse(
                "stream ended before completion".to_string(),
            ));
        }
        Ok((self.text, self.usage))
    }

}

/// Drain a message event stream into its final text
pub async fn collect_text(mut events: MessageEventStream) -> Result<(String, Usage)> {
    let mut builder = MessageBuilder::new();
    while let Some(event) = events.next().await {
        let terminal = event.is_terminal();
        builder.process_event(&event);
        if terminal {
            break;
        }
    }
    builder.finish()
}

/// Turn a message event stream into a cancellable stream of text fragments.
///
/// The stream yields `Err(Error::Aborted)` once and ends as soon as `cancel`
/// fires; provider errors are yielded as `Err(Error::Sse)`.
pub fn text_fragments(mut events: MessageEventStream, cancel: CancellationToken) -> TextStream {
    Box::pin(stream! {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = events.next() => Some(next),
            };

            let Some(next) = next else {
                yield Err(Error::Aborted);
                return;
            };

            match next {
                Some(MessageEvent::TextDelta { delta }) => {
                    if !delta.is_empty() {
                        yield Ok(delta);
                    }
                }
                Some(MessageEvent::Error { message }) => {
                    yield Err(Error::Sse(message));
                    return;
                }
                Some(MessageEvent::Done { .. }) | None => return,
                Some(MessageEvent::Start { .. }) => {}
            }
        }
    })
}
