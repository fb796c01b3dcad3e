//! LLM API HTTP Client
//!
//! Supports both the Claude API and OpenAI-compatible APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{Error, Result};

use super::lenient::from_lenient_json;
use super::types::*;

/// Vision-capable chat operation, abstracted so callers can be tested
/// against a stub client.
#[async_trait]
pub trait VisionChat: Send + Sync {
    /// Send a text + image exchange and return the model's text reply
    async fn chat_image(
        &self,
        system_prompt: &str,
        user_message: &str,
        base64_image: &str,
        media_type: &str,
    ) -> Result<String>;
}

/// LLM API client (supports Claude and OpenAI-compatible APIs)
///
/// Holds one long-lived HTTP client and no per-call state, so a single
/// instance may be shared across concurrent callers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
}

impl LlmClient {
    /// Create a new LLM client.
    ///
    /// Fails immediately when no API key is configured; a missing
    /// credential is never deferred to the first request.
    pub fn new(config: &Config) -> Result<Self> {
        let llm_config = config.llm_config();

        if llm_config.api_key.is_empty() {
            return Err(Error::Config(
                "LLM API key is not configured (set LLM_API_KEY)".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let base_url = match &llm_config.base_url {
            Some(url) => url.clone(),
            None => match llm_config.provider {
                LlmProvider::Claude => "https://api.anthropic.com/v1".to_string(),
                LlmProvider::OpenAi => "https://api.openai.com/v1".to_string(),
            },
        };

        Ok(Self {
            client,
            api_key: llm_config.api_key.clone(),
            model: llm_config.model.clone(),
            base_url,
            provider: llm_config.provider.clone(),
        })
    }

    /// Create with a custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Send a messages request to the configured provider
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        match self.provider {
            LlmProvider::Claude => self.send_claude_request(request).await,
            LlmProvider::OpenAi => self.send_openai_request(request).await,
        }
    }

    /// Send a request to the Claude API
    async fn send_claude_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/messages", self.base_url);

        debug!("Sending request to Claude API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Claude API error: {} - {}", status, body);
            return Err(Error::Api(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;

        info!(
            "Claude API response: stop_reason={}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Send a request to an OpenAI-compatible API
    async fn send_openai_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let openai_request = ChatCompletionRequest::from_claude_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::Api(format!("{}: {}", status, body)));
        }

        let openai_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;

        let parsed = openai_response.to_claude_response();

        info!(
            "OpenAI API response: stop_reason={}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Create a messages request builder
    pub fn request_builder(&self) -> MessagesRequestBuilder {
        MessagesRequestBuilder::new(self.model.clone())
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Send a simple two-message chat exchange and return the reply text
    pub async fn chat_text(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let request = self
            .request_builder()
            .system(system_prompt)
            .user(user_message)
            .build();

        let response = self.messages(request).await.map_err(|e| {
            warn!("LLM chat request failed: {}", e);
            e
        })?;

        Self::reply_text(&response)
    }

    /// Send a chat exchange carrying an image and return the reply text.
    ///
    /// The base64 payload is transmitted exactly as given; it is only
    /// decoded here to reject malformed input before the request goes out.
    pub async fn chat_image(
        &self,
        system_prompt: &str,
        user_message: &str,
        base64_image: &str,
        media_type: &str,
    ) -> Result<String> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, base64_image)
            .map_err(|e| Error::Other(format!("Invalid base64 image data: {}", e)))?;

        let image = ImageSource::base64(media_type, base64_image);
        let request = self
            .request_builder()
            .system(system_prompt)
            .message(Message::user_with_image(user_message, image))
            .build();

        let response = self.messages(request).await.map_err(|e| {
            warn!("LLM vision request failed: {}", e);
            e
        })?;

        Self::reply_text(&response)
    }

    /// Send a chat exchange constrained to JSON output and decode the
    /// reply into `T`.
    ///
    /// Transport failures propagate; a reply that does not decode into a
    /// meaningful value yields `Ok(None)`.
    pub async fn chat_json<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<Option<T>> {
        // The Claude API has no response_format parameter, so the JSON
        // constraint rides on the prompt there.
        let system = match self.provider {
            LlmProvider::OpenAi => system_prompt.to_string(),
            LlmProvider::Claude => format!(
                "{}\n\nRespond with a single JSON object and nothing else.",
                system_prompt
            ),
        };

        let request = self
            .request_builder()
            .system(system)
            .user(user_message)
            .json_object()
            .build();

        let response = self.messages(request).await.map_err(|e| {
            warn!("LLM JSON chat request failed: {}", e);
            e
        })?;

        let text = response.first_text().unwrap_or("");
        Ok(from_lenient_json(text))
    }

    fn reply_text(response: &MessagesResponse) -> Result<String> {
        response
            .first_text()
            .map(|t| t.to_string())
            .ok_or_else(|| Error::Api("Response contained no text content".to_string()))
    }
}

#[async_trait]
impl VisionChat for LlmClient {
    async fn chat_image(
        &self,
        system_prompt: &str,
        user_message: &str,
        base64_image: &str,
        media_type: &str,
    ) -> Result<String> {
        LlmClient::chat_image(self, system_prompt, user_message, base64_image, media_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn config_with_key(api_key: &str) -> Config {
        Config {
            llm: LlmConfig {
                api_key: api_key.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = LlmClient::new(&config_with_key(""));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_with_api_key() {
        let client = LlmClient::new(&config_with_key("sk-test")).unwrap();
        assert_eq!(client.model(), "claude-sonnet-4-20250514");
        assert_eq!(client.base_url, "https://api.anthropic.com/v1");
    }

    #[test]
    fn test_with_base_url() {
        let client = LlmClient::with_base_url(
            &config_with_key("sk-test"),
            "http://localhost:8080/v1".to_string(),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[tokio::test]
    async fn test_chat_image_rejects_invalid_base64() {
        let client = LlmClient::new(&config_with_key("sk-test")).unwrap();
        let result = client
            .chat_image("system", "user", "not@valid@base64", "image/png")
            .await;
        assert!(matches!(result, Err(Error::Other(_))));
    }
}
