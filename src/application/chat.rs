//! Advice chat service: streamed conversation and one-shot prose advice.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::prompt::{
    chat_system_prompt, chat_user_message, personalized_advice_prompt, ADVICE_SYSTEM_MESSAGE,
};
use crate::domain::{compose_advice, Conditions, PromptContext, UserProfile};
use crate::ports::{GenerationRequest, TextGenerator};
use crate::AtmosguardError;

/// Emitted once when the chat provider cannot be reached or fails mid-stream.
pub const CHAT_APOLOGY: &str = "Sorry, I'm having trouble connecting. Please try again.";

/// Returned when one-shot advice is requested without a stored location.
pub const LOCATION_REQUIRED: &str = "Please set your location first";

const CHAT_MAX_TOKENS: u32 = 800;
const ADVICE_MAX_TOKENS: u32 = 400;

/// How a chat turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The full reply.
    Completed(String),
    /// The provider failed; whatever arrived before the failure.
    Failed { partial: String },
}

/// Which path produced one-shot advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Generated,
    RuleBased,
}

/// One-shot personalized advice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedAdvice {
    pub uv_index: f64,
    pub risk_level: String,
    pub location: String,
    pub advice: String,
    pub source: AdviceSource,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Service for generated advice.
pub struct AdviceChatService<G: TextGenerator> {
    generator: Arc<G>,
}

impl<G: TextGenerator> AdviceChatService<G> {
    /// Create a new chat service.
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }

    /// Stream a chat reply to `sink`.
    ///
    /// `conditions` is `None` when the profile has no location; the prompt
    /// then marks the conditions as unknown. On any provider failure
    /// [`CHAT_APOLOGY`] is delivered to `sink` exactly once.
    pub fn stream_reply(
        &self,
        profile: &UserProfile,
        conditions: Option<&Conditions>,
        input: &str,
        sink: &mut dyn FnMut(&str),
    ) -> ChatOutcome {
        let ctx = PromptContext::new(profile, conditions);
        let request = GenerationRequest::new(chat_system_prompt(&ctx), chat_user_message(input))
            .max_tokens(CHAT_MAX_TOKENS);

        let mut partial = String::new();
        let result = self.generator.stream(&request, &mut |chunk: &str| {
            partial.push_str(chunk);
            sink(chunk);
        });

        match result {
            Ok(reply) => {
                tracing::debug!("Chat reply complete ({} chars)", reply.len());
                ChatOutcome::Completed(reply)
            }
            Err(e) => {
                tracing::warn!("Advice chat failed: {}", e);
                sink(CHAT_APOLOGY);
                ChatOutcome::Failed { partial }
            }
        }
    }

    /// Prose advice for the profile's location.
    ///
    /// Falls back to the rule-based tips, one per line, if generation fails.
    ///
    /// # Errors
    /// Returns `Precondition` if the profile has no stored location.
    pub fn personalized_advice(
        &self,
        profile: &UserProfile,
        conditions: &Conditions,
    ) -> Result<PersonalizedAdvice, AtmosguardError> {
        let Some(location) = profile.preferred_location.as_ref() else {
            return Err(AtmosguardError::Precondition(LOCATION_REQUIRED.to_string()));
        };

        let prompt = personalized_advice_prompt(&PromptContext::new(profile, Some(conditions)));
        let request =
            GenerationRequest::new(ADVICE_SYSTEM_MESSAGE, prompt).max_tokens(ADVICE_MAX_TOKENS);

        let (advice, source) = match self.generator.generate(&request) {
            Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), AdviceSource::Generated),
            Ok(_) => {
                tracing::warn!("Advice generation returned no text, using rule-based tips");
                (rule_based_text(profile, conditions), AdviceSource::RuleBased)
            }
            Err(e) => {
                tracing::warn!("Advice generation failed, using rule-based tips: {}", e);
                (rule_based_text(profile, conditions), AdviceSource::RuleBased)
            }
        };

        Ok(PersonalizedAdvice {
            uv_index: conditions.uv.index,
            risk_level: conditions.uv.label.to_string(),
            location: location.name.clone(),
            advice,
            source,
            generated_at: chrono::Utc::now(),
        })
    }
}

fn rule_based_text(profile: &UserProfile, conditions: &Conditions) -> String {
    compose_advice(profile, &conditions.snapshot).join("\n")
}
