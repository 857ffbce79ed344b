//! Prompt builders for the text-generation provider.

use std::fmt::Write as _;

use super::conditions::Conditions;
use super::profile::UserProfile;

/// User message sent when the chat input is empty.
pub const DEFAULT_CHAT_MESSAGE: &str = "Hello! Give me today's sun protection advice.";

/// System message for one-shot personalized advice.
pub const ADVICE_SYSTEM_MESSAGE: &str = "You are a caring dermatology AI assistant.";

/// Word limit requested for one-shot advice.
pub const ADVICE_WORD_LIMIT: usize = 280;

/// Profile and (when known) current conditions embedded in every prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub profile: &'a UserProfile,
    pub conditions: Option<&'a Conditions>,
}

impl<'a> PromptContext<'a> {
    #[must_use]
    pub fn new(profile: &'a UserProfile, conditions: Option<&'a Conditions>) -> Self {
        Self {
            profile,
            conditions,
        }
    }

    fn location_name(&self) -> &str {
        self.profile
            .preferred_location
            .as_ref()
            .map_or("Unknown location", |l| l.name.as_str())
    }

    fn write_profile(&self, out: &mut String) {
        let p = self.profile;
        let age = p.age.map_or_else(|| "Not specified".to_string(), |a| a.to_string());
        let (skin_type, skin_desc) = p
            .skin_type
            .map_or(("Unknown", "Not specified"), |t| (t.as_str(), t.description()));
        let condition = p.skin_condition.map_or("None specified", |c| c.label());

        let _ = writeln!(out, "User Profile:");
        let _ = writeln!(out, "- Name: {}", if p.name.is_empty() { "User" } else { p.name.as_str() });
        let _ = writeln!(out, "- Age: {age}");
        let _ = writeln!(out, "- Skin Type (Fitzpatrick): {skin_type} ({skin_desc})");
        let _ = writeln!(out, "- Skin Condition: {condition}");
        let _ = writeln!(
            out,
            "- Skin Cancer History: {}",
            if p.has_skin_cancer_history { "Yes" } else { "No" }
        );
        let _ = writeln!(out, "- Location: {}", self.location_name());
    }

    fn write_conditions(&self, out: &mut String) {
        let _ = writeln!(out, "Today's Conditions:");
        let Some(c) = self.conditions else {
            let _ = writeln!(out, "- Temperature: N/A");
            let _ = writeln!(out, "- Weather: Unknown");
            let _ = writeln!(out, "- UV Index: N/A (Unknown)");
            let _ = writeln!(out, "- Air Quality: N/A (Unknown)");
            return;
        };
        let s = &c.snapshot;
        let _ = writeln!(out, "- Temperature: {:.1}°C (feels like {:.1}°C)", s.temperature, s.feels_like);
        let _ = writeln!(out, "- Weather: {} ({})", s.condition, s.description);
        let _ = writeln!(out, "- Humidity: {:.0}%", s.humidity);
        let _ = writeln!(out, "- Wind: {:.0} km/h {}", s.wind_speed, s.wind_compass());
        let _ = writeln!(out, "- UV Index: {:.1}/11 ({})", c.uv.index, c.uv.label);
        let _ = writeln!(out, "- Air Quality: {:.0} ({})", c.aqi.value, c.aqi.level);
        if !s.fetched {
            let _ = writeln!(out, "- Note: live data was unavailable; values are estimates");
        }
    }
}

/// Prompt asking for a clothing recommendation as a strict JSON object.
#[must_use]
pub fn clothing_prompt(ctx: &PromptContext<'_>) -> String {
    let mut out = String::from(
        "You are a dermatologist and outdoor clothing expert helping a user dress for today's sun and air conditions.\n\n",
    );
    ctx.write_profile(&mut out);
    out.push('\n');
    ctx.write_conditions(&mut out);
    out.push_str(
        "\nRespond with ONLY a JSON object with exactly these keys:\n\
         {\n  \"headwear\": [string],\n  \"upperBody\": [string],\n  \"lowerBody\": [string],\n  \
         \"footwear\": [string],\n  \"accessories\": [string],\n  \
         \"specialConsiderations\": [string],\n  \"overallAdvice\": string\n}\n\
         Each list holds 1 to 4 short, specific items (mention UPF ratings, hat brim width, lens protection). \
         specialConsiderations covers the user's skin condition, history and age. \
         overallAdvice is two or three sentences. Do not add any other keys or text.",
    );
    out
}

/// System prompt for the advice chat.
#[must_use]
pub fn chat_system_prompt(ctx: &PromptContext<'_>) -> String {
    let mut out =
        String::from("You are a compassionate, expert AI sun protection advisor for AtmosGuard.\n\n");
    ctx.write_profile(&mut out);
    out.push('\n');
    ctx.write_conditions(&mut out);
    out.push_str(
        "\nYou are warm, encouraging, and give clear, actionable advice. \
         Always base suggestions on the user's personal risk factors and current conditions.",
    );
    out
}

/// Chat user message, substituting the default greeting for blank input.
#[must_use]
pub fn chat_user_message(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_CHAT_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Prompt for one-shot personalized advice in prose.
#[must_use]
pub fn personalized_advice_prompt(ctx: &PromptContext<'_>) -> String {
    let mut out = String::from(
        "You are a compassionate dermatologist assistant for AtmosGuard, an app that protects people \
         with skin conditions and skin cancer history from harmful UV rays.\n\n",
    );
    ctx.write_profile(&mut out);
    out.push('\n');
    ctx.write_conditions(&mut out);
    let _ = write!(
        out,
        "\nGive warm, caring, and highly personalized sun protection advice including:\n\
         1. Exact clothing recommendations (long sleeve, pants, hat type, UPF rating)\n\
         2. Accessories (sunglasses, gloves, neck gaiter, etc.)\n\
         3. Best times to avoid sun today\n\
         4. Additional tips (sunscreen SPF, reapplication, shade, etc.)\n\
         5. A short encouraging message\n\n\
         Respond in natural, empathetic paragraphs, like talking to a worried patient.\n\
         Do NOT use bullet points unless asked.\n\
         Keep total response under {ADVICE_WORD_LIMIT} words.\n"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::{AqiScale, EnvironmentalSnapshot, PollutantComponents};
    use crate::domain::profile::{Location, SkinCondition, SkinType};

    fn fixture() -> (UserProfile, Conditions) {
        let mut profile = UserProfile::new("Ada");
        profile.skin_type = Some(SkinType::II);
        profile.skin_condition = Some(SkinCondition::Vitiligo);
        profile.age = Some(34);
        profile.preferred_location = Some(Location::new("Lisbon", 38.72, -9.14));
        let snapshot = EnvironmentalSnapshot {
            temperature: 27.4,
            feels_like: 28.0,
            humidity: 61.0,
            wind_speed: 14.0,
            wind_direction: 315.0,
            weather_code: 0,
            condition: "Clear".to_string(),
            description: "Clear sky".to_string(),
            uv_index: 8.2,
            aqi: 35.0,
            aqi_scale: AqiScale::Us,
            components: PollutantComponents::default(),
            fetched: true,
            fetched_at: chrono::Utc::now(),
        };
        (profile, Conditions::assess(snapshot))
    }

    #[test]
    fn test_clothing_prompt_embeds_profile_and_contract() {
        let (profile, conditions) = fixture();
        let ctx = PromptContext::new(&profile, Some(&conditions));
        let prompt = clothing_prompt(&ctx);
        assert!(prompt.contains("Fair - usually burns, tans minimally"));
        assert!(prompt.contains("Vitiligo"));
        assert!(prompt.contains("UV Index: 8.2/11 (Very High)"));
        assert!(prompt.contains("\"specialConsiderations\""));
        assert!(prompt.contains("Wind: 14 km/h NW"));
    }

    #[test]
    fn test_advice_prompt_word_limit() {
        let (profile, conditions) = fixture();
        let ctx = PromptContext::new(&profile, Some(&conditions));
        assert!(personalized_advice_prompt(&ctx).contains("under 280 words"));
        assert!(chat_system_prompt(&ctx).contains("Location: Lisbon"));
    }

    #[test]
    fn test_prompt_without_conditions() {
        let profile = UserProfile::new("");
        let prompt = chat_system_prompt(&PromptContext::new(&profile, None));
        assert!(prompt.contains("- Name: User"));
        assert!(prompt.contains("UV Index: N/A (Unknown)"));
        assert!(prompt.contains("Skin Type (Fitzpatrick): Unknown (Not specified)"));
    }

    #[test]
    fn test_chat_user_message_default() {
        assert_eq!(chat_user_message("   "), DEFAULT_CHAT_MESSAGE);
        assert_eq!(chat_user_message(" Can I swim today? "), "Can I swim today?");
    }
}
