//! Clothing recommendations and the deterministic rule-based composer.
//!
//! The generated path lives in the application layer; it must produce the
//! same [`ClothingRecommendation`] shape as [`compose_rule_based`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::conditions::Conditions;
use super::environment::EnvironmentalSnapshot;
use super::profile::{AgeBracket, SkinCondition, UserProfile};
use super::risk::{AqiClassification, UvClassification, AQI_SENSITIVE_TIER, AQI_UNHEALTHY_TIER};

/// Clothing categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClothingCategory {
    Headwear,
    UpperBody,
    LowerBody,
    Footwear,
    Accessories,
}

impl ClothingCategory {
    pub const ALL: [ClothingCategory; 5] = [
        ClothingCategory::Headwear,
        ClothingCategory::UpperBody,
        ClothingCategory::LowerBody,
        ClothingCategory::Footwear,
        ClothingCategory::Accessories,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Headwear => "Headwear",
            Self::UpperBody => "Upper body",
            Self::LowerBody => "Lower body",
            Self::Footwear => "Footwear",
            Self::Accessories => "Accessories",
        }
    }

    /// Search phrases tried, in order, after the item-derived phrase fails.
    #[must_use]
    pub fn fallback_phrases(&self) -> &'static [&'static str] {
        match self {
            Self::Headwear => &["sun hat", "wide brim hat"],
            Self::UpperBody => &["long sleeve shirt", "linen shirt"],
            Self::LowerBody => &["linen pants", "lightweight trousers"],
            Self::Footwear => &["walking shoes", "sneakers"],
            Self::Accessories => &["sunglasses", "uv umbrella"],
        }
    }

    /// Image used when every lookup for the category fails.
    #[must_use]
    pub fn placeholder(&self) -> ImageRef {
        let (url, attribution) = match self {
            Self::Headwear => (
                "https://placehold.co/400x300?text=Sun+Hat",
                "AtmosGuard placeholder (headwear)",
            ),
            Self::UpperBody => (
                "https://placehold.co/400x300?text=Long+Sleeve+Shirt",
                "AtmosGuard placeholder (upper body)",
            ),
            Self::LowerBody => (
                "https://placehold.co/400x300?text=Light+Pants",
                "AtmosGuard placeholder (lower body)",
            ),
            Self::Footwear => (
                "https://placehold.co/400x300?text=Walking+Shoes",
                "AtmosGuard placeholder (footwear)",
            ),
            Self::Accessories => (
                "https://placehold.co/400x300?text=Sunglasses",
                "AtmosGuard placeholder (accessories)",
            ),
        };
        ImageRef {
            url: url.to_string(),
            attribution: attribution.to_string(),
        }
    }
}

/// Reference to an illustrative image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub attribution: String,
}

/// Structured clothing advice. Field names follow the generated-JSON contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingRecommendation {
    pub headwear: Vec<String>,
    pub upper_body: Vec<String>,
    pub lower_body: Vec<String>,
    pub footwear: Vec<String>,
    pub accessories: Vec<String>,
    pub special_considerations: Vec<String>,
    pub overall_advice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<ClothingCategory, Vec<ImageRef>>>,
}

impl ClothingRecommendation {
    #[must_use]
    pub fn items(&self, category: ClothingCategory) -> &[String] {
        match category {
            ClothingCategory::Headwear => &self.headwear,
            ClothingCategory::UpperBody => &self.upper_body,
            ClothingCategory::LowerBody => &self.lower_body,
            ClothingCategory::Footwear => &self.footwear,
            ClothingCategory::Accessories => &self.accessories,
        }
    }

    fn items_mut(&mut self, category: ClothingCategory) -> &mut Vec<String> {
        match category {
            ClothingCategory::Headwear => &mut self.headwear,
            ClothingCategory::UpperBody => &mut self.upper_body,
            ClothingCategory::LowerBody => &mut self.lower_body,
            ClothingCategory::Footwear => &mut self.footwear,
            ClothingCategory::Accessories => &mut self.accessories,
        }
    }

    /// Categories with at least one item.
    pub fn non_empty_categories(&self) -> impl Iterator<Item = ClothingCategory> + '_ {
        ClothingCategory::ALL
            .into_iter()
            .filter(|c| !self.items(*c).is_empty())
    }

    fn push_unique(&mut self, category: ClothingCategory, item: &str) {
        let items = self.items_mut(category);
        if !items.iter().any(|i| i == item) {
            items.push(item.to_string());
        }
    }
}

pub const WIDE_BRIM_HAT: &str = "Wide-brimmed sun hat (3-inch brim or wider)";
pub const NECK_COVER: &str = "Neck gaiter or legionnaire-style neck flap";
pub const UPF50_SHIRT: &str = "Long-sleeve UPF 50+ shirt";
pub const TIGHT_WEAVE: &str = "Lightweight, tightly woven breathable top";
pub const LONG_PANTS: &str = "Long, lightweight UPF pants";
pub const LOOSE_BOTTOMS: &str = "Loose, breathable trousers or knee-length skirt";
pub const SUNGLASSES: &str = "Wraparound sunglasses with 100% UV protection (UV400)";
pub const UV_UMBRELLA: &str = "UV-blocking umbrella for shade";
pub const WALKING_SHOES: &str = "Comfortable walking shoes";
pub const BREATHABLE_SOCKS: &str = "Breathable socks";
pub const RESPIRATOR_MASK: &str = "N95 or KN95 respirator mask";
pub const LIGHT_MASK: &str = "Light cloth or surgical face mask";
pub const LONG_SLEEVES: &str = "Long sleeves to limit pollutant contact with skin";

/// Clothing set for one UV tier.
struct UvTier {
    /// Exclusive lower bound; the first tier whose bound is exceeded applies.
    above: f64,
    headwear: &'static [&'static str],
    upper_body: &'static [&'static str],
    lower_body: &'static [&'static str],
    accessories: &'static [&'static str],
    sentence: &'static str,
}

const UV_TIERS: [UvTier; 4] = [
    UvTier {
        above: 7.0,
        headwear: &[WIDE_BRIM_HAT, NECK_COVER],
        upper_body: &[UPF50_SHIRT, TIGHT_WEAVE],
        lower_body: &[LONG_PANTS, LOOSE_BOTTOMS],
        accessories: &[SUNGLASSES, UV_UMBRELLA],
        sentence: "UV is very high: cover as much skin as possible with UPF-rated clothing and seek shade between 10 AM and 4 PM.",
    },
    UvTier {
        above: 5.0,
        headwear: &[WIDE_BRIM_HAT],
        upper_body: &[UPF50_SHIRT, TIGHT_WEAVE],
        lower_body: &[LONG_PANTS, LOOSE_BOTTOMS],
        accessories: &[SUNGLASSES],
        sentence: "UV is high: wear a wide-brimmed hat and long sleeves, and limit midday sun.",
    },
    UvTier {
        above: 3.0,
        headwear: &[WIDE_BRIM_HAT],
        upper_body: &[TIGHT_WEAVE],
        lower_body: &[LOOSE_BOTTOMS],
        accessories: &[SUNGLASSES],
        sentence: "UV is moderate: a hat, sunglasses and breathable covering are enough for most outings.",
    },
    UvTier {
        above: f64::NEG_INFINITY,
        headwear: &[],
        upper_body: &[TIGHT_WEAVE],
        lower_body: &[LOOSE_BOTTOMS],
        accessories: &[SUNGLASSES],
        sentence: "UV is low: light, comfortable clothing and sunglasses are sufficient.",
    },
];

const FOOTWEAR: [&str; 2] = [WALKING_SHOES, BREATHABLE_SOCKS];

const AQI_UNHEALTHY_SENTENCE: &str =
    "Air quality is unhealthy: wear a well-fitted respirator mask outdoors and keep skin covered.";
const AQI_SENSITIVE_SENTENCE: &str =
    "Air quality may affect sensitive groups: consider a light mask for longer outings.";

fn uv_tier(uv_index: f64) -> &'static UvTier {
    UV_TIERS
        .iter()
        .find(|t| uv_index > t.above)
        .unwrap_or(&UV_TIERS[UV_TIERS.len() - 1])
}

fn special_considerations(profile: &UserProfile, snapshot: &EnvironmentalSnapshot) -> Vec<String> {
    let mut out = Vec::new();
    if profile.has_skin_cancer_history {
        out.push("Skin cancer history: choose UPF 50+ fabrics and cover scars and previously treated areas.".to_string());
    }
    match profile.skin_condition {
        Some(SkinCondition::Lupus) => out.push(
            "Lupus: UV can trigger flares, so prefer full-coverage UPF clothing even on cloudy days.".to_string(),
        ),
        Some(SkinCondition::Eczema | SkinCondition::Psoriasis) => out.push(
            "Sensitive skin: pick soft, breathable natural fibres and avoid rough or synthetic seams.".to_string(),
        ),
        Some(SkinCondition::Vitiligo) => out.push(
            "Vitiligo: make sure depigmented patches are fully covered or protected with high-SPF sunscreen."
                .to_string(),
        ),
        _ => {}
    }
    match profile.age_bracket() {
        Some(AgeBracket::Child) => {
            out.push("Children burn faster: keep hats and sleeves on during outdoor play.".to_string());
        }
        Some(AgeBracket::Senior) => {
            out.push("Choose loose, light layers to stay cool and hydrated.".to_string());
        }
        _ => {}
    }
    if profile.skin_type.is_some_and(|t| t.is_fair()) {
        out.push("Fair skin burns quickly: favour darker or tightly woven fabrics, which block more UV.".to_string());
    }
    if snapshot.humidity > 70.0 {
        out.push("High humidity: moisture-wicking fabrics will stay comfortable longer.".to_string());
    }
    out
}

/// Compose a clothing recommendation from fixed thresholds.
///
/// Never fails. `images` is left unset.
#[must_use]
pub fn compose_rule_based(
    profile: &UserProfile,
    snapshot: &EnvironmentalSnapshot,
    uv: &UvClassification,
    aqi: &AqiClassification,
) -> ClothingRecommendation {
    let tier = uv_tier(uv.index);
    let to_vec = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

    let mut rec = ClothingRecommendation {
        headwear: to_vec(tier.headwear),
        upper_body: to_vec(tier.upper_body),
        lower_body: to_vec(tier.lower_body),
        footwear: to_vec(&FOOTWEAR),
        accessories: to_vec(tier.accessories),
        special_considerations: special_considerations(profile, snapshot),
        overall_advice: tier.sentence.to_string(),
        images: None,
    };

    let aqi_sentence = if aqi.tier >= AQI_UNHEALTHY_TIER {
        rec.push_unique(ClothingCategory::Accessories, RESPIRATOR_MASK);
        rec.push_unique(ClothingCategory::UpperBody, LONG_SLEEVES);
        Some(AQI_UNHEALTHY_SENTENCE)
    } else if aqi.tier >= AQI_SENSITIVE_TIER {
        rec.push_unique(ClothingCategory::Accessories, LIGHT_MASK);
        Some(AQI_SENSITIVE_SENTENCE)
    } else {
        None
    };
    if let Some(sentence) = aqi_sentence {
        rec.overall_advice.push(' ');
        rec.overall_advice.push_str(sentence);
    }

    rec
}

/// Compose from already-classified conditions.
#[must_use]
pub fn compose_for(profile: &UserProfile, conditions: &Conditions) -> ClothingRecommendation {
    compose_rule_based(profile, &conditions.snapshot, &conditions.uv, &conditions.aqi)
}

/// Keyword → search phrase. Checked in order; more specific keys first.
const SEARCH_KEYWORDS: &[(&str, &str)] = &[
    ("sunglasses", "sunglasses"),
    ("umbrella", "uv umbrella"),
    ("respirator", "n95 mask"),
    ("mask", "face mask"),
    ("gaiter", "neck gaiter"),
    ("neck", "neck gaiter"),
    ("hat", "sun hat"),
    ("cap", "baseball cap"),
    ("shirt", "long sleeve shirt"),
    ("sleeve", "long sleeve shirt"),
    ("top", "linen top"),
    ("pants", "linen pants"),
    ("trousers", "linen pants"),
    ("skirt", "summer skirt"),
    ("shorts", "shorts"),
    ("shoes", "walking shoes"),
    ("sandals", "sandals"),
    ("socks", "socks"),
    ("gloves", "uv gloves"),
    ("glasses", "sunglasses"),
];

/// Derive an image-search phrase from an item description.
///
/// Keywords match whole words, singular or plural. Returns `None` when no
/// keyword matches.
#[must_use]
pub fn search_phrase(item: &str) -> Option<&'static str> {
    let lower = item.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    SEARCH_KEYWORDS
        .iter()
        .find(|(keyword, _)| {
            words
                .iter()
                .any(|w| w == keyword || w.strip_suffix('s') == Some(*keyword))
        })
        .map(|(_, phrase)| *phrase)
}

/// Ordered, de-duplicated phrases to try for a category, starting with the
/// phrase derived from its first item.
#[must_use]
pub fn search_phrases(category: ClothingCategory, items: &[String]) -> Vec<&'static str> {
    let mut phrases = Vec::new();
    if let Some(phrase) = items.first().and_then(|i| search_phrase(i)) {
        phrases.push(phrase);
    }
    for phrase in category.fallback_phrases() {
        if !phrases.contains(phrase) {
            phrases.push(*phrase);
        }
    }
    phrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::{AqiScale, PollutantComponents};
    use crate::domain::profile::SkinType;

    fn snapshot(uv: f64, aqi: f64) -> EnvironmentalSnapshot {
        EnvironmentalSnapshot {
            temperature: 28.0,
            feels_like: 29.0,
            humidity: 50.0,
            wind_speed: 8.0,
            wind_direction: 200.0,
            weather_code: 1,
            condition: "Mainly Clear".to_string(),
            description: "Mainly clear".to_string(),
            uv_index: uv,
            aqi,
            aqi_scale: AqiScale::Us,
            components: PollutantComponents::default(),
            fetched: true,
            fetched_at: chrono::Utc::now(),
        }
    }

    fn compose(uv: f64, aqi: f64) -> ClothingRecommendation {
        let profile = UserProfile::new("Test");
        compose_for(&profile, &Conditions::assess(snapshot(uv, aqi)))
    }

    #[test]
    fn test_high_uv_unhealthy_air() {
        let rec = compose(8.0, 170.0);
        assert!(rec.headwear.iter().any(|i| i == WIDE_BRIM_HAT));
        assert!(rec.upper_body.iter().any(|i| i.contains("UPF")));
        assert!(rec.accessories.iter().any(|i| i == RESPIRATOR_MASK));
        assert!(rec.upper_body.iter().any(|i| i == LONG_SLEEVES));
        assert_eq!(rec.footwear, vec![WALKING_SHOES, BREATHABLE_SOCKS]);
        assert!(rec.overall_advice.contains("very high"));
        assert!(rec.overall_advice.contains("respirator"));
        assert!(rec.images.is_none());
    }

    #[test]
    fn test_sensitive_air_gets_light_mask() {
        let rec = compose(1.0, 120.0);
        assert!(rec.accessories.iter().any(|i| i == LIGHT_MASK));
        assert!(!rec.accessories.iter().any(|i| i == RESPIRATOR_MASK));

        let clean = compose(1.0, 40.0);
        assert_eq!(clean.accessories, vec![SUNGLASSES]);
        assert_eq!(clean.overall_advice, UV_TIERS[3].sentence);
    }

    #[test]
    fn test_tiers_are_nested_subsets() {
        for pair in UV_TIERS.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            for (hi, lo) in [
                (upper.headwear, lower.headwear),
                (upper.upper_body, lower.upper_body),
                (upper.lower_body, lower.lower_body),
                (upper.accessories, lower.accessories),
            ] {
                assert!(lo.iter().all(|i| hi.contains(i)));
            }
            let total = |t: &UvTier| {
                t.headwear.len() + t.upper_body.len() + t.lower_body.len() + t.accessories.len()
            };
            assert!(total(lower) < total(upper));
            assert!(total(lower) > 0);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(compose(7.0, 10.0).headwear, vec![WIDE_BRIM_HAT]);
        assert_eq!(compose(7.1, 10.0).headwear.len(), 2);
        assert!(compose(3.0, 10.0).headwear.is_empty());
        assert_eq!(compose(5.0, 10.0).upper_body, vec![TIGHT_WEAVE]);
        assert_eq!(compose(f64::NAN, 10.0).headwear.len(), 0);
    }

    #[test]
    fn test_special_considerations() {
        let mut profile = UserProfile::new("Test");
        profile.skin_type = Some(SkinType::II);
        profile.skin_condition = Some(SkinCondition::Lupus);
        profile.has_skin_cancer_history = true;
        let rec = compose_for(&profile, &Conditions::assess(snapshot(6.0, 10.0)));
        assert_eq!(rec.special_considerations.len(), 3);
        assert!(rec.special_considerations[0].starts_with("Skin cancer history"));
    }

    #[test]
    fn test_search_phrase() {
        assert_eq!(search_phrase(WIDE_BRIM_HAT), Some("sun hat"));
        assert_eq!(search_phrase(SUNGLASSES), Some("sunglasses"));
        assert_eq!(search_phrase(UPF50_SHIRT), Some("long sleeve shirt"));
        assert_eq!(search_phrase(WALKING_SHOES), Some("walking shoes"));
        assert_eq!(search_phrase(RESPIRATOR_MASK), Some("n95 mask"));
        assert_eq!(search_phrase("Something unusual"), None);
    }

    #[test]
    fn test_search_phrase_matches_whole_words() {
        assert_eq!(search_phrase("Landscape-print cotton shirt"), Some("long sleeve shirt"));
        assert_eq!(search_phrase("Topaz silk scarf"), None);
        assert_eq!(search_phrase("Two cotton caps"), Some("baseball cap"));
        assert_eq!(search_phrase("Loose top with long sleeves"), Some("long sleeve shirt"));
        assert_eq!(search_phrase(UPF50_SHIRT), Some("long sleeve shirt"));
        assert_eq!(search_phrase(WIDE_BRIM_HAT), Some("sun hat"));
    }

    #[test]
    fn test_search_phrases_dedup() {
        let items = vec![WIDE_BRIM_HAT.to_string()];
        assert_eq!(
            search_phrases(ClothingCategory::Headwear, &items),
            vec!["sun hat", "wide brim hat"]
        );
        assert_eq!(
            search_phrases(ClothingCategory::Footwear, &[]),
            vec!["walking shoes", "sneakers"]
        );
    }

    #[test]
    fn test_serialization_uses_contract_names() {
        let json = serde_json::to_value(compose(6.0, 10.0)).expect("Should serialize");
        assert!(json.get("upperBody").is_some());
        assert!(json.get("specialConsiderations").is_some());
        assert!(json.get("overallAdvice").is_some());
        assert!(json.get("images").is_none());
    }
}
