//! Engine tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the task engine and its collaborator calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance in points kept from the page edge when placing objects
    pub margin: f32,
    /// Scale used for page previews
    pub preview_scale: f32,
    /// Scale used when rasterizing pages for table extraction
    pub table_render_scale: f32,
    /// Maximum number of pages sent for table extraction
    pub table_page_limit: usize,
    /// Seconds a streaming chat reply may go without a fragment
    pub chat_idle_timeout_secs: u64,
    /// Maximum characters of document text sent to the completion service
    pub document_text_limit: usize,
    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margin: crate::position::DEFAULT_MARGIN,
            preview_scale: 1.5,
            table_render_scale: 2.0,
            table_page_limit: 5,
            chat_idle_timeout_secs: 60,
            document_text_limit: 30_000,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Idle timeout for streaming chat replies
    pub fn chat_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_idle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"margin": 36, "table_page_limit": 2}"#).unwrap();
        assert_eq!(config.margin, 36.0);
        assert_eq!(config.table_page_limit, 2);
        assert_eq!(config.table_render_scale, 2.0);
        assert_eq!(config.chat_idle_timeout(), Duration::from_secs(60));
    }
}
