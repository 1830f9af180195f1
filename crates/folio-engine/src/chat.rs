//! Consumer side of a streaming chat reply

use std::time::Duration;

use folio_ai::TextStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// How a streamed reply ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatOutcome {
    Complete,
    Cancelled,
    /// No fragment arrived within the idle timeout
    TimedOut,
}

/// A finished, or stopped, chat reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub outcome: ChatOutcome,
}

/// Accumulates streamed fragments until the stream ends, the caller cancels,
/// or the stream goes quiet for longer than the idle timeout.
#[derive(Debug)]
pub struct ChatAccumulator {
    text: String,
    idle_timeout: Duration,
}

impl ChatAccumulator {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            text: String::new(),
            idle_timeout,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drain `stream`, calling `on_delta` for every fragment
    pub async fn drain<F>(
        &mut self,
        mut stream: TextStream,
        cancel: &CancellationToken,
        mut on_delta: F,
    ) -> Result<ChatOutcome>
    where
        F: FnMut(&str),
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(ChatOutcome::Cancelled),
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            match next {
                Err(_) => {
                    tracing::warn!("Chat stream idle for {:?}, stopping", self.idle_timeout);
                    return Ok(ChatOutcome::TimedOut);
                }
                Ok(None) => return Ok(ChatOutcome::Complete),
                Ok(Some(Ok(fragment))) => {
                    self.text.push_str(&fragment);
                    on_delta(&fragment);
                }
                Ok(Some(Err(folio_ai::Error::Aborted))) => return Ok(ChatOutcome::Cancelled),
                Ok(Some(Err(e))) => return Err(e.into()),
            }
        }
    }

    pub fn finish(self, outcome: ChatOutcome) -> ChatReply {
        ChatReply {
            text: self.text,
            outcome,
        }
    }
}
