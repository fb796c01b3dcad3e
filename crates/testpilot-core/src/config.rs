//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. testpilot.toml configuration file
//! 3. Default values
//!
//! Inside the config file, `${VAR_NAME}` expands to the environment
//! variable's value.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    #[default]
    Claude,
    /// OpenAI-compatible API (OpenAI, Azure-style deployments, etc.)
    OpenAi,
}

impl LlmProvider {
    /// Parse a provider name, defaulting to Claude on unknown values
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "openai" | "azure" => LlmProvider::OpenAi,
            _ => LlmProvider::Claude,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model / deployment name to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::Claude,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Browser engine name (chromium, chrome, edge)
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Whether to run the browser headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Viewport width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Viewport height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            headless: default_headless(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_engine() -> String {
    "chromium".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

/// Main configuration for testpilot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Capture configuration
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Raw TOML structure (all fields optional so partial files parse)
#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    llm: Option<TomlLlm>,
    capture: Option<TomlCapture>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlm {
    api_key: Option<String>,
    model: Option<String>,
    provider: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlCapture {
    engine: Option<String>,
    headless: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
}

impl Config {
    /// Expand `${VAR_NAME}` occurrences with environment variable values.
    ///
    /// Missing variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` inside the file is replaced with the environment
    /// variable's value. Environment variables still take precedence over
    /// file values.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut cfg = Self::from_toml_config(config);
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./testpilot.toml` first, falling back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("testpilot.toml").exists() {
            return Self::from_toml_file("testpilot.toml");
        }

        Self::from_env()
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();

        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            model: llm.model.unwrap_or_else(default_model),
            provider: LlmProvider::from_name(&llm.provider.unwrap_or_default()),
            base_url: llm.base_url,
        };

        let capture = toml.capture.unwrap_or_default();
        let capture_config = CaptureConfig {
            engine: capture.engine.unwrap_or_else(default_engine),
            headless: capture.headless.unwrap_or_else(default_headless),
            width: capture.width.unwrap_or_else(default_width),
            height: capture.height.unwrap_or_else(default_height),
        };

        Config {
            llm: llm_config,
            capture: capture_config,
        }
    }

    /// Override file values with environment variables where set
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            if !api_key.is_empty() {
                self.llm.api_key = api_key;
            }
        }

        if let Ok(model) = std::env::var("LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }

        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            if !provider.is_empty() {
                self.llm.provider = LlmProvider::from_name(&provider);
            }
        }

        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            if !base_url.is_empty() {
                self.llm.base_url = Some(base_url);
            }
        }

        if let Ok(engine) = std::env::var("BROWSER_ENGINE") {
            if !engine.is_empty() {
                self.capture.engine = engine;
            }
        }

        if let Ok(headless) = std::env::var("BROWSER_HEADLESS") {
            self.capture.headless = headless.to_lowercase() != "false";
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> crate::Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| Error::Config("LLM_API_KEY not set".to_string()))?;

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| default_model());

        let provider =
            LlmProvider::from_name(&std::env::var("LLM_PROVIDER").unwrap_or_default());

        let base_url = std::env::var("LLM_BASE_URL").ok();

        let mut config = Config {
            llm: LlmConfig {
                api_key,
                model,
                provider,
                base_url,
            },
            capture: CaptureConfig::default(),
        };

        if let Ok(engine) = std::env::var("BROWSER_ENGINE") {
            if !engine.is_empty() {
                config.capture.engine = engine;
            }
        }
        if let Ok(headless) = std::env::var("BROWSER_HEADLESS") {
            config.capture.headless = headless.to_lowercase() != "false";
        }

        Ok(config)
    }

    /// Get the LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_name() {
        assert_eq!(LlmProvider::from_name("claude"), LlmProvider::Claude);
        assert_eq!(LlmProvider::from_name("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_name("OpenAI"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_name("azure"), LlmProvider::OpenAi);
        // Unknown providers fall back to Claude
        assert_eq!(LlmProvider::from_name("something"), LlmProvider::Claude);
        assert_eq!(LlmProvider::from_name("glm"), LlmProvider::Claude);
        assert_eq!(LlmProvider::from_name(""), LlmProvider::Claude);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.provider, LlmProvider::Claude);
        assert_eq!(config.capture.engine, "chromium");
        assert!(config.capture.headless);
        assert_eq!(config.capture.width, 1920);
        assert_eq!(config.capture.height, 1080);
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TESTPILOT_TEST_VAR", "secret-key");
        let expanded = Config::expand_env_vars("api_key = \"${TESTPILOT_TEST_VAR}\"");
        assert_eq!(expanded, "api_key = \"secret-key\"");
        std::env::remove_var("TESTPILOT_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let expanded = Config::expand_env_vars("key = \"${TESTPILOT_NO_SUCH_VAR}\"");
        assert_eq!(expanded, "key = \"\"");
    }

    #[test]
    fn test_from_toml_config_partial() {
        let toml: TomlConfig = toml::from_str(
            r#"
            [llm]
            api_key = "sk-test"
            provider = "openai"
            "#,
        )
        .unwrap();

        let config = Config::from_toml_config(toml);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        // Unset fields fall back to defaults
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.capture.engine, "chromium");
    }

    #[test]
    fn test_from_toml_config_capture_section() {
        let toml: TomlConfig = toml::from_str(
            r#"
            [capture]
            engine = "edge"
            headless = false
            width = 1280
            height = 720
            "#,
        )
        .unwrap();

        let config = Config::from_toml_config(toml);
        assert_eq!(config.capture.engine, "edge");
        assert!(!config.capture.headless);
        assert_eq!(config.capture.width, 1280);
        assert_eq!(config.capture.height, 720);
    }
}
