//! OpenRouter adapter: OpenAI-compatible chat completions.
//!
//! `generate` issues a single completion, optionally in JSON-object mode.
//! `stream` reads the server-sent-event body line by line and forwards each
//! content delta to the caller's sink until `[DONE]`.

use std::io::{BufRead, BufReader};

use serde::{Deserialize, Serialize};

use crate::adapters::http::{require_key, HttpClient};
use crate::ports::{GenerationRequest, ProviderError, ResponseFormat, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

const REFERER: &str = "https://atmosguard.vercel.app";
const TITLE: &str = "AtmosGuard";

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireFormat>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// One decoded line of an SSE body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A content fragment.
    Chunk(String),
    /// The `[DONE]` terminator.
    Done,
    /// Comments, keep-alives, role-only deltas and blank lines.
    Skip,
}

/// Decode one SSE line.
///
/// # Errors
/// Returns `ProviderError::Malformed` for undecodable `data:` payloads and
/// `ProviderError::Request` when the provider reports an in-stream error.
pub fn parse_sse_line(line: &str) -> Result<SseEvent, ProviderError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }
    if data.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let chunk: StreamChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(ProviderError::Request(format!("stream error: {error}")));
    }
    let content: String = chunk
        .choices
        .into_iter()
        .filter_map(|c| c.delta.and_then(|d| d.content))
        .collect();
    if content.is_empty() {
        Ok(SseEvent::Skip)
    } else {
        Ok(SseEvent::Chunk(content))
    }
}

/// Extract the first choice's text from a completion.
///
/// # Errors
/// Returns `ProviderError::Malformed` when no non-blank content is present.
pub fn completion_text(response: CompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ProviderError::Malformed("completion has no content".to_string()))
}

/// OpenRouter chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: HttpClient,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenRouterClient {
    #[must_use]
    pub fn new(http: HttpClient, api_key: Option<String>, base_url: &str, model: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> Result<Vec<(&'static str, String)>, ProviderError> {
        let key = require_key(self.api_key.as_deref(), "OpenRouter")?;
        Ok(vec![
            ("Authorization", format!("Bearer {key}")),
            ("HTTP-Referer", REFERER.to_string()),
            ("X-Title", TITLE.to_string()),
        ])
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest, stream: bool) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
            response_format: match request.format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(WireFormat {
                    kind: "json_object",
                }),
            },
        }
    }
}

impl TextGenerator for OpenRouterClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let headers = self.headers()?;
        tracing::debug!("Requesting completion from {}", self.model);
        let response: CompletionResponse =
            self.http
                .post_json(&self.endpoint(), &self.body(request, false), &headers)?;
        completion_text(response)
    }

    fn stream(
        &self,
        request: &GenerationRequest,
        sink: &mut dyn FnMut(&str),
    ) -> Result<String, ProviderError> {
        let headers = self.headers()?;
        tracing::debug!("Streaming completion from {}", self.model);
        let response = self
            .http
            .post(&self.endpoint(), &self.body(request, true), &headers)?;

        let mut full = String::new();
        let mut reader = BufReader::new(response);
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| ProviderError::Request(e.to_string()))?;
            if read == 0 {
                break;
            }
            match parse_sse_line(&line)? {
                SseEvent::Chunk(text) => {
                    sink(&text);
                    full.push_str(&text);
                }
                SseEvent::Done => break,
                SseEvent::Skip => {}
            }
        }

        if full.trim().is_empty() {
            return Err(ProviderError::Malformed("stream produced no content".to_string()));
        }
        Ok(full)
    }
}
