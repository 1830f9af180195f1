//! Configuration file support

use folio_ai::Provider;
use folio_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for folio
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default provider (google, anthropic)
    pub provider: Option<String>,
    /// Default model to use
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// API keys (alternative to environment variables)
    pub api_keys: ApiKeys,
    /// Engine tuning
    pub engine: EngineConfig,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub google: Option<String>,
    pub anthropic: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FOLIO_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write `example_config()` to the config path unless a file is already there
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// API key for a provider, from config then environment
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_config = match provider {
            Provider::Google => self.api_keys.google.clone(),
            Provider::Anthropic => self.api_keys.anthropic.clone(),
        };
        if from_config.is_some() {
            return from_config;
        }

        let fallback = match provider {
            Provider::Google => Some("GEMINI_API_KEY"),
            Provider::Anthropic => None,
        };
        std::env::var(provider.api_key_env_var())
            .ok()
            .or_else(|| fallback.and_then(|var| std::env::var(var).ok()))
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# folio configuration file
# Place at ~/.config/folio/config.toml (Linux/Mac) or %APPDATA%\folio\config.toml (Windows)

# Completion provider (google, anthropic)
provider = "google"

# Model to use; defaults to the provider's default model
# model = "gemini-2.5-flash"

# max_tokens = 8192
# temperature = 0.2

# API keys (optional - can also use GOOGLE_API_KEY / ANTHROPIC_API_KEY)
[api_keys]
# google = "..."
# anthropic = "sk-ant-..."

[engine]
# margin = 50.0
# preview_scale = 1.5
# table_render_scale = 2.0
# table_page_limit = 5
# chat_idle_timeout_secs = 60
# document_text_limit = 30000
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.provider.as_deref(), Some("google"));
        assert_eq!(config.engine.table_page_limit, EngineConfig::default().table_page_limit);
    }

    #[test]
    fn test_engine_section_overrides() {
        let config: Config = toml::from_str(
            "model = \"claude-x\"\n[engine]\ntable_page_limit = 2\n",
        )
        .unwrap();
        assert_eq!(config.model.as_deref(), Some("claude-x"));
        assert_eq!(config.engine.table_page_limit, 2);
        assert_eq!(config.engine.margin, EngineConfig::default().margin);
    }

    #[test]
    fn test_api_key_prefers_config() {
        let config = Config {
            api_keys: ApiKeys {
                anthropic: Some("from-config".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.api_key(Provider::Anthropic).as_deref(), Some("from-config"));
    }
}
