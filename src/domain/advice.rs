//! Rule-based daily sun-protection advice.
//!
//! Rules are evaluated in a fixed order and every matching rule contributes.
//! The result is never empty and never longer than [`MAX_ADVICE`].

use super::environment::EnvironmentalSnapshot;
use super::profile::{AgeBracket, SkinCondition, UserProfile};
use super::risk::{classify_aqi, sanitize_index, AQI_SENSITIVE_TIER};

/// Maximum number of advice entries returned.
pub const MAX_ADVICE: usize = 5;

/// Returned when no rule fires.
pub const DEFAULT_ADVICE: [&str; 2] = [
    "Remember to apply sunscreen 15 minutes before going outside and reapply every 2 hours.",
    "Wear protective clothing, a wide-brimmed hat, and UV-blocking sunglasses.",
];

/// UV index above which midday avoidance is advised.
pub const UV_HIGH_THRESHOLD: f64 = 7.0;
/// UV index above which moderate protection is advised.
pub const UV_MODERATE_THRESHOLD: f64 = 5.0;
/// Relative humidity (percent) above which more frequent reapplication is advised.
pub const HUMIDITY_THRESHOLD: f64 = 70.0;

type Contribution = fn(&UserProfile, &EnvironmentalSnapshot) -> Vec<String>;

/// A named advice rule.
struct AdviceRule {
    name: &'static str,
    contribute: Contribution,
}

const RULES: &[AdviceRule] = &[
    AdviceRule {
        name: "skin_type",
        contribute: skin_type_advice,
    },
    AdviceRule {
        name: "age",
        contribute: age_advice,
    },
    AdviceRule {
        name: "skin_condition",
        contribute: skin_condition_advice,
    },
    AdviceRule {
        name: "cancer_history",
        contribute: cancer_history_advice,
    },
    AdviceRule {
        name: "uv_index",
        contribute: uv_advice,
    },
    AdviceRule {
        name: "air_quality",
        contribute: air_quality_advice,
    },
    AdviceRule {
        name: "humidity",
        contribute: humidity_advice,
    },
];

fn skin_type_advice(profile: &UserProfile, _: &EnvironmentalSnapshot) -> Vec<String> {
    let Some(skin_type) = profile.skin_type else {
        return Vec::new();
    };
    let text = if skin_type.is_fair() {
        format!("Your fair skin (Type {skin_type}) is highly sensitive to UV rays. Use SPF 50+ sunscreen daily.")
    } else if skin_type.is_dark() {
        format!("While your darker skin (Type {skin_type}) has natural protection, UV rays still cause damage. Use SPF 30+.")
    } else {
        format!("Your skin type {skin_type} requires regular sun protection. Apply sunscreen every 2 hours when outdoors.")
    };
    vec![text]
}

fn age_advice(profile: &UserProfile, _: &EnvironmentalSnapshot) -> Vec<String> {
    let text = match profile.age_bracket() {
        Some(AgeBracket::Child) => {
            "Children's skin is more sensitive. Ensure proper sun protection during outdoor activities."
        }
        Some(AgeBracket::YoungAdult) => {
            "Your skin is in its prime protection years. Establishing good habits now prevents future damage."
        }
        Some(AgeBracket::Senior) => "Mature skin needs extra hydration alongside sun protection.",
        Some(AgeBracket::Adult) | None => return Vec::new(),
    };
    vec![text.to_string()]
}

fn skin_condition_advice(profile: &UserProfile, _: &EnvironmentalSnapshot) -> Vec<String> {
    let mut out = Vec::new();
    let condition = profile.skin_condition;
    if matches!(
        condition,
        Some(SkinCondition::Eczema | SkinCondition::Psoriasis)
    ) {
        out.push(
            "Choose mineral-based sunscreens (zinc oxide/titanium dioxide) to avoid irritating sensitive skin."
                .to_string(),
        );
    }
    if condition == Some(SkinCondition::Lupus) {
        out.push(
            "Lupus requires maximum sun protection. Wear UPF 50+ clothing and broad-spectrum sunscreen."
                .to_string(),
        );
    }
    if condition == Some(SkinCondition::Vitiligo) {
        out.push(
            "Protect depigmented areas with high SPF sunscreen and consider wearing protective clothing."
                .to_string(),
        );
    }
    out
}

fn cancer_history_advice(profile: &UserProfile, _: &EnvironmentalSnapshot) -> Vec<String> {
    if !profile.has_skin_cancer_history {
        return Vec::new();
    }
    vec![
        "Due to your skin cancer history, regular skin checks are crucial. Consult a dermatologist annually."
            .to_string(),
        "Use maximum protection: SPF 50+, UPF clothing, and avoid peak sun hours.".to_string(),
    ]
}

fn uv_advice(_: &UserProfile, snapshot: &EnvironmentalSnapshot) -> Vec<String> {
    let uv = sanitize_index(Some(snapshot.uv_index));
    if uv > UV_HIGH_THRESHOLD {
        vec!["High UV levels detected. Limit outdoor activities between 10 AM and 4 PM.".to_string()]
    } else if uv > UV_MODERATE_THRESHOLD {
        vec!["Moderate UV levels. Wear protective clothing and apply sunscreen.".to_string()]
    } else {
        Vec::new()
    }
}

fn air_quality_advice(_: &UserProfile, snapshot: &EnvironmentalSnapshot) -> Vec<String> {
    let aqi = classify_aqi(snapshot.aqi, snapshot.aqi_scale);
    if aqi.tier >= AQI_SENSITIVE_TIER {
        vec!["Poor air quality may affect respiratory health. Consider limiting outdoor exercise.".to_string()]
    } else {
        Vec::new()
    }
}

fn humidity_advice(_: &UserProfile, snapshot: &EnvironmentalSnapshot) -> Vec<String> {
    if snapshot.humidity > HUMIDITY_THRESHOLD {
        vec!["High humidity can make sunscreen less effective. Reapply more frequently.".to_string()]
    } else {
        Vec::new()
    }
}

/// Evaluate every rule and return each entry tagged with its rule name,
/// before defaults and truncation.
#[must_use]
pub fn compose_tagged_advice(
    profile: &UserProfile,
    snapshot: &EnvironmentalSnapshot,
) -> Vec<(&'static str, String)> {
    RULES
        .iter()
        .flat_map(|rule| {
            (rule.contribute)(profile, snapshot)
                .into_iter()
                .map(move |text| (rule.name, text))
        })
        .collect()
}

/// Compose the daily advice list for a profile under current conditions.
#[must_use]
pub fn compose_advice(profile: &UserProfile, snapshot: &EnvironmentalSnapshot) -> Vec<String> {
    let mut advice: Vec<String> = compose_tagged_advice(profile, snapshot)
        .into_iter()
        .map(|(_, text)| text)
        .collect();

    if advice.is_empty() {
        advice = DEFAULT_ADVICE.iter().map(|s| (*s).to_string()).collect();
    }
    advice.truncate(MAX_ADVICE);
    advice
}
