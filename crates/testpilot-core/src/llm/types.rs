//! LLM API wire types
//!
//! Requests are built in the Claude Messages shape and converted to the
//! OpenAI Chat Completions shape when the configured provider needs it.

use serde::{Deserialize, Serialize};

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Create a user message with text and an image
    pub fn user_with_image(text: impl Into<String>, image: ImageSource) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                MessageContent::Text { text: text.into() },
                MessageContent::Image { source: image },
            ],
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Get text content from the message
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| {
                if let MessageContent::Text { text } = c {
                    Some(text.clone())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the message contains images
    pub fn has_images(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::Image { .. }))
    }
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Image { source: ImageSource },
}

/// Image source for multimodal input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    /// Supported image media types
    pub const MEDIA_TYPE_PNG: &'static str = "image/png";
    pub const MEDIA_TYPE_JPEG: &'static str = "image/jpeg";

    /// Create a new image source from base64 data
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Create an image source from raw bytes (encodes to base64)
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes),
        }
    }

    /// Create a PNG image source from bytes
    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes(Self::MEDIA_TYPE_PNG, bytes)
    }

    /// Decode base64 data to bytes
    pub fn decode(&self) -> Option<Vec<u8>> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.data).ok()
    }

    /// Convert to a data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    /// Ask the model to produce a single JSON object. Not part of the
    /// Claude wire format; consumed when converting to the OpenAI shape.
    #[serde(skip)]
    pub json_object: bool,
}

/// Messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub response_type: String,
    pub role: String,
    pub content: Vec<MessageContent>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
    pub stop_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    /// First text block of the response, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| {
            if let MessageContent::Text { text } = c {
                Some(text.as_str())
            } else {
                None
            }
        })
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// ============================================================================
// OpenAI-compatible types
// ============================================================================

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: OpenAiContent,
}

impl OpenAiMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: OpenAiContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: OpenAiContent::Text(text.into()),
        }
    }
}

/// OpenAI message content: plain string or multimodal content parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiContentPart>),
}

/// OpenAI multimodal content part
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiImageUrl },
}

/// Image reference carried as a data URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiImageUrl {
    pub url: String,
}

/// Response format constraint (JSON mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Convert from a Claude-style request
    pub fn from_claude_request(req: &MessagesRequest) -> Self {
        let mut messages = Vec::new();

        if let Some(system) = &req.system {
            messages.push(OpenAiMessage::system(system));
        }

        for msg in &req.messages {
            let content = if msg.has_images() {
                let parts = msg
                    .content
                    .iter()
                    .map(|c| match c {
                        MessageContent::Text { text } => {
                            OpenAiContentPart::Text { text: text.clone() }
                        }
                        MessageContent::Image { source } => OpenAiContentPart::ImageUrl {
                            image_url: OpenAiImageUrl {
                                url: source.to_data_url(),
                            },
                        },
                    })
                    .collect();
                OpenAiContent::Parts(parts)
            } else {
                OpenAiContent::Text(msg.text_content())
            };

            messages.push(OpenAiMessage {
                role: msg.role.clone(),
                content,
            });
        }

        Self {
            model: req.model.clone(),
            messages,
            max_tokens: Some(req.max_tokens),
            response_format: if req.json_object {
                Some(ResponseFormat::json_object())
            } else {
                None
            },
        }
    }
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessageResponse,
    pub finish_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenAiUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl ChatCompletionResponse {
    /// Convert to a Claude-style response
    pub fn to_claude_response(&self) -> MessagesResponse {
        let choice = self.choices.first();

        let content = match choice {
            Some(c) => vec![MessageContent::Text {
                text: c.message.content.clone().unwrap_or_default(),
            }],
            None => vec![MessageContent::Text {
                text: String::new(),
            }],
        };

        let stop_reason = choice
            .map(|c| match c.finish_reason.as_str() {
                "stop" => "end_turn".to_string(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "end_turn".to_string());

        MessagesResponse {
            id: self.id.clone(),
            response_type: "message".to_string(),
            role: "assistant".to_string(),
            content,
            model: self.model.clone(),
            stop_sequence: None,
            stop_reason,
            usage: self.usage.as_ref().map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        }
    }
}

/// Builder for creating messages requests
pub struct MessagesRequestBuilder {
    model: String,
    max_tokens: u64,
    system: Option<String>,
    messages: Vec<Message>,
    json_object: bool,
}

impl MessagesRequestBuilder {
    pub fn new(model: String) -> Self {
        Self {
            model,
            max_tokens: 4096,
            system: None,
            messages: vec![],
            json_object: false,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    pub fn json_object(mut self) -> Self {
        self.json_object = true;
        self
    }

    pub fn build(self) -> MessagesRequest {
        MessagesRequest {
            model: self.model,
            max_tokens: self.max_tokens,
            system: self.system,
            messages: self.messages,
            json_object: self.json_object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_source_base64() {
        let img = ImageSource::base64("image/png", "dGVzdA==");
        assert_eq!(img.source_type, "base64");
        assert_eq!(img.media_type, "image/png");
        assert_eq!(img.data, "dGVzdA==");
    }

    #[test]
    fn test_image_source_round_trip() {
        let original = b"raw screenshot bytes";
        let img = ImageSource::png(original);
        let decoded = img.decode().unwrap();
        assert_eq!(decoded.as_slice(), original);
    }

    #[test]
    fn test_image_source_to_data_url() {
        let img = ImageSource::base64("image/png", "dGVzdA==");
        assert_eq!(img.to_data_url(), "data:image/png;base64,dGVzdA==");
    }

    #[test]
    fn test_message_user_with_image() {
        let img = ImageSource::png(b"test");
        let msg = Message::user_with_image("What's in this image?", img);

        assert_eq!(msg.role, "user");
        assert!(msg.has_images());
        // 1 text + 1 image = 2 content blocks
        assert_eq!(msg.content.len(), 2);
    }

    #[test]
    fn test_message_with_image_serialization() {
        let img = ImageSource::png(b"test");
        let msg = Message::user_with_image("Describe this", img);
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains(r#""type":"text""#));
        assert!(json.contains(r#""type":"image""#));
        assert!(json.contains(r#""media_type":"image/png""#));
    }

    #[test]
    fn test_first_text() {
        let response = MessagesResponse {
            id: "msg_1".to_string(),
            response_type: "message".to_string(),
            role: "assistant".to_string(),
            content: vec![MessageContent::Text {
                text: "Looks good".to_string(),
            }],
            model: "test".to_string(),
            stop_sequence: None,
            stop_reason: "end_turn".to_string(),
            usage: None,
        };
        assert_eq!(response.first_text(), Some("Looks good"));
    }

    #[test]
    fn test_openai_conversion_text_only() {
        let request = MessagesRequestBuilder::new("gpt-4o".to_string())
            .system("You are helpful")
            .user("Hello")
            .build();

        let openai = ChatCompletionRequest::from_claude_request(&request);
        assert_eq!(openai.messages.len(), 2);
        assert_eq!(openai.messages[0].role, "system");
        assert!(matches!(openai.messages[1].content, OpenAiContent::Text(_)));
        assert!(openai.response_format.is_none());
    }

    #[test]
    fn test_openai_conversion_image_becomes_data_url_part() {
        let img = ImageSource::png(b"pixels");
        let request = MessagesRequestBuilder::new("gpt-4o".to_string())
            .message(Message::user_with_image("Check this", img))
            .build();

        let openai = ChatCompletionRequest::from_claude_request(&request);
        let OpenAiContent::Parts(parts) = &openai.messages[0].content else {
            panic!("expected content parts");
        };
        assert_eq!(parts.len(), 2);
        let OpenAiContentPart::ImageUrl { image_url } = &parts[1] else {
            panic!("expected image part");
        };
        assert!(image_url.url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_openai_conversion_json_mode() {
        let request = MessagesRequestBuilder::new("gpt-4o".to_string())
            .user("Give me JSON")
            .json_object()
            .build();

        let openai = ChatCompletionRequest::from_claude_request(&request);
        let format = openai.response_format.as_ref().unwrap();
        assert_eq!(format.format_type, "json_object");

        let json = serde_json::to_string(&openai).unwrap();
        assert!(json.contains(r#""response_format":{"type":"json_object"}"#));
    }

    #[test]
    fn test_json_object_flag_not_serialized() {
        let request = MessagesRequestBuilder::new("claude".to_string())
            .user("Give me JSON")
            .json_object()
            .build();

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("json_object"));
    }

    #[test]
    fn test_to_claude_response() {
        let openai = ChatCompletionResponse {
            id: "chatcmpl-1".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model: "gpt-4o".to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessageResponse {
                    role: "assistant".to_string(),
                    content: Some("Verdict: pass".to_string()),
                },
                finish_reason: "stop".to_string(),
            }],
            usage: None,
        };

        let claude = openai.to_claude_response();
        assert_eq!(claude.first_text(), Some("Verdict: pass"));
        assert_eq!(claude.stop_reason, "end_turn");
    }
}
