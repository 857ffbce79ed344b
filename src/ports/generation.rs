//! Text-generation port.
//!
//! Generation is request/response with an optional incremental mode used by
//! the advice chat.

use super::ProviderError;

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Shape hint for the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// A generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub format: ResponseFormat,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Single-prompt request with a system message.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            format: ResponseFormat::Text,
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    #[must_use]
    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::JsonObject;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text-generation provider.
pub trait TextGenerator: Send + Sync {
    /// Generate a complete response.
    ///
    /// # Errors
    /// Returns error if the provider fails or returns no content.
    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Generate incrementally, handing each text fragment to `sink` as it
    /// arrives. Returns the full text.
    ///
    /// The default implementation delivers the whole response as one chunk.
    ///
    /// # Errors
    /// Returns error if the provider fails before or during streaming.
    fn stream(
        &self,
        request: &GenerationRequest,
        sink: &mut dyn FnMut(&str),
    ) -> Result<String, ProviderError> {
        let text = self.generate(request)?;
        sink(&text);
        Ok(text)
    }
}
