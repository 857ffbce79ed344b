//! Clothing service: generated or rule-based recommendations, plus images.
//!
//! Two strategies implement [`ClothingStrategy`]. [`ClothingService`] tries
//! the generated one and falls back to the rule-based one on any error, then
//! attaches one image per non-empty category. Nothing here fails the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::clothing::{compose_for, search_phrases};
use crate::domain::prompt::clothing_prompt;
use crate::domain::{
    ClothingCategory, ClothingRecommendation, Conditions, ImageRef, PromptContext, UserProfile,
};
use crate::ports::{GenerationRequest, ImageSearch, ProviderError, TextGenerator};

/// Token budget for a generated recommendation.
const CLOTHING_MAX_TOKENS: u32 = 700;

const CLOTHING_SYSTEM_MESSAGE: &str =
    "You are a sun-protection clothing advisor. Reply with a single JSON object only.";

/// Why a strategy could not produce a recommendation.
#[derive(Debug, thiserror::Error)]
pub enum ClothingError {
    #[error("Generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Generated recommendation is not valid JSON: {0}")]
    Parse(String),

    #[error("Generated recommendation is empty")]
    Empty,
}

/// Produces a clothing recommendation for a profile under given conditions.
pub trait ClothingStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// # Errors
    /// Returns error if the strategy cannot produce a usable recommendation.
    fn compose(
        &self,
        profile: &UserProfile,
        conditions: &Conditions,
    ) -> Result<ClothingRecommendation, ClothingError>;
}

/// Deterministic threshold rules. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClothing;

impl ClothingStrategy for RuleBasedClothing {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn compose(
        &self,
        profile: &UserProfile,
        conditions: &Conditions,
    ) -> Result<ClothingRecommendation, ClothingError> {
        Ok(compose_for(profile, conditions))
    }
}

/// Recommendation produced by a text generator in JSON mode.
pub struct GeneratedClothing<G: TextGenerator> {
    generator: Arc<G>,
}

impl<G: TextGenerator> GeneratedClothing<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerator> ClothingStrategy for GeneratedClothing<G> {
    fn name(&self) -> &'static str {
        "generated"
    }

    fn compose(
        &self,
        profile: &UserProfile,
        conditions: &Conditions,
    ) -> Result<ClothingRecommendation, ClothingError> {
        let prompt = clothing_prompt(&PromptContext::new(profile, Some(conditions)));
        let request = GenerationRequest::new(CLOTHING_SYSTEM_MESSAGE, prompt)
            .json()
            .max_tokens(CLOTHING_MAX_TOKENS);
        let raw = self.generator.generate(&request)?;
        parse_generated(&raw)
    }
}

/// Wire shape of a generated recommendation. Every key is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GeneratedPayload {
    headwear: Vec<String>,
    upper_body: Vec<String>,
    lower_body: Vec<String>,
    footwear: Vec<String>,
    accessories: Vec<String>,
    special_considerations: Vec<String>,
    overall_advice: String,
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse generated text into a recommendation.
///
/// # Errors
/// Returns `ClothingError::Parse` if the text is not the expected JSON
/// object, and `ClothingError::Empty` if it names no items or no advice.
pub fn parse_generated(raw: &str) -> Result<ClothingRecommendation, ClothingError> {
    let payload: GeneratedPayload =
        serde_json::from_str(strip_fence(raw)).map_err(|e| ClothingError::Parse(e.to_string()))?;

    let recommendation = ClothingRecommendation {
        headwear: clean(payload.headwear),
        upper_body: clean(payload.upper_body),
        lower_body: clean(payload.lower_body),
        footwear: clean(payload.footwear),
        accessories: clean(payload.accessories),
        special_considerations: clean(payload.special_considerations),
        overall_advice: payload.overall_advice.trim().to_string(),
        images: None,
    };

    if recommendation.overall_advice.is_empty()
        || recommendation.non_empty_categories().next().is_none()
    {
        return Err(ClothingError::Empty);
    }
    Ok(recommendation)
}

/// Which strategy produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothingSource {
    Generated,
    RuleBased,
}

/// A recommendation and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ClothingAdvice {
    #[serde(flatten)]
    pub recommendation: ClothingRecommendation,
    pub source: ClothingSource,
}

/// Run `primary`, falling back to `fallback` on error.
///
/// The fallback must not fail; if it does anyway the rule-based composer
/// answers.
pub fn compose_with_fallback(
    primary: &dyn ClothingStrategy,
    fallback: &dyn ClothingStrategy,
    profile: &UserProfile,
    conditions: &Conditions,
) -> ClothingAdvice {
    match primary.compose(profile, conditions) {
        Ok(recommendation) => ClothingAdvice {
            recommendation,
            source: ClothingSource::Generated,
        },
        Err(e) => {
            tracing::warn!(
                "{} clothing strategy failed, using {}: {}",
                primary.name(),
                fallback.name(),
                e
            );
            let recommendation = fallback
                .compose(profile, conditions)
                .unwrap_or_else(|_| compose_for(profile, conditions));
            ClothingAdvice {
                recommendation,
                source: ClothingSource::RuleBased,
            }
        }
    }
}

/// Look up one image for a category, trying each phrase in order.
fn lookup_category<I: ImageSearch>(
    images: &I,
    category: ClothingCategory,
    items: &[String],
) -> ImageRef {
    for phrase in search_phrases(category, items) {
        match images.search(phrase) {
            Ok(image) => return image,
            Err(e) => tracing::debug!("Image lookup for '{}' failed: {}", phrase, e),
        }
    }
    tracing::debug!("Using placeholder image for {}", category.label());
    category.placeholder()
}

/// Attach one image per non-empty category. Lookups run concurrently and
/// fail independently to the category placeholder.
pub fn attach_images<I: ImageSearch>(images: &I, recommendation: &mut ClothingRecommendation) {
    let categories: Vec<ClothingCategory> = recommendation.non_empty_categories().collect();
    let rec = &*recommendation;

    let found: BTreeMap<ClothingCategory, Vec<ImageRef>> = std::thread::scope(|scope| {
        let handles: Vec<_> = categories
            .iter()
            .map(|&category| {
                let handle = scope.spawn(move || lookup_category(images, category, rec.items(category)));
                (category, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(category, handle)| {
                let image = handle.join().unwrap_or_else(|_| category.placeholder());
                (category, vec![image])
            })
            .collect()
    });

    recommendation.images = Some(found);
}

/// Clothing use case: strategy selection plus image augmentation.
pub struct ClothingService<G, I>
where
    G: TextGenerator,
    I: ImageSearch,
{
    generated: GeneratedClothing<G>,
    rule_based: RuleBasedClothing,
    images: Arc<I>,
}

impl<G, I> ClothingService<G, I>
where
    G: TextGenerator,
    I: ImageSearch,
{
    /// Create a new clothing service.
    pub fn new(generator: Arc<G>, images: Arc<I>) -> Self {
        Self {
            generated: GeneratedClothing::new(generator),
            rule_based: RuleBasedClothing,
            images,
        }
    }

    /// Recommend clothing without images.
    pub fn recommend(&self, profile: &UserProfile, conditions: &Conditions) -> ClothingAdvice {
        let advice = compose_with_fallback(&self.generated, &self.rule_based, profile, conditions);
        tracing::info!(
            "Clothing recommendation ready (source: {:?}, live data: {})",
            advice.source,
            conditions.is_live()
        );
        advice
    }

    /// Recommend clothing and attach illustrative images.
    pub fn recommend_with_images(
        &self,
        profile: &UserProfile,
        conditions: &Conditions,
    ) -> ClothingAdvice {
        let mut advice = self.recommend(profile, conditions);
        attach_images(self.images.as_ref(), &mut advice.recommendation);
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clothing::{RESPIRATOR_MASK, WALKING_SHOES, WIDE_BRIM_HAT};
    use crate::domain::{AqiScale, EnvironmentalSnapshot, PollutantComponents, SkinType};
    use std::sync::Mutex;

    struct ScriptedGenerator(Result<String, ProviderError>);

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            self.0.clone()
        }
    }

    /// Finds images only for the listed phrases and records every query.
    struct ScriptedImages {
        known: Vec<&'static str>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedImages {
        fn new(known: Vec<&'static str>) -> Self {
            Self {
                known,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageSearch for ScriptedImages {
        fn search(&self, phrase: &str) -> Result<ImageRef, ProviderError> {
            self.queries
                .lock()
                .expect("Should lock")
                .push(phrase.to_string());
            if self.known.contains(&phrase) {
                Ok(ImageRef {
                    url: format!("https://images.example/{}", phrase.replace(' ', "-")),
                    attribution: "test".to_string(),
                })
            } else {
                Err(ProviderError::NoResults(phrase.to_string()))
            }
        }
    }

    fn conditions(uv: f64, aqi: f64) -> Conditions {
        Conditions::assess(EnvironmentalSnapshot {
            temperature: 30.0,
            feels_like: 32.0,
            humidity: 40.0,
            wind_speed: 10.0,
            wind_direction: 270.0,
            weather_code: 0,
            condition: "Clear".to_string(),
            description: "Clear sky".to_string(),
            uv_index: uv,
            aqi,
            aqi_scale: AqiScale::Us,
            components: PollutantComponents::default(),
            fetched: true,
            fetched_at: chrono::Utc::now(),
        })
    }

    fn profile() -> UserProfile {
        let mut p = UserProfile::new("Ada");
        p.skin_type = Some(SkinType::II);
        p.age = Some(40);
        p
    }

    const VALID_JSON: &str = r#"{
        "headwear": ["Bucket hat"],
        "upperBody": ["  Linen shirt  ", ""],
        "lowerBody": ["Chinos"],
        "footwear": ["Canvas shoes"],
        "accessories": [],
        "specialConsiderations": ["Reapply sunscreen"],
        "overallAdvice": "Cover up at midday."
    }"#;

    #[test]
    fn test_parse_generated_cleans_items() {
        let rec = parse_generated(VALID_JSON).expect("Should parse");
        assert_eq!(rec.upper_body, vec!["Linen shirt"]);
        assert!(rec.accessories.is_empty());
        assert!(rec.images.is_none());
    }

    #[test]
    fn test_parse_generated_accepts_fenced_json() {
        let fenced = format!("```json\n{VALID_JSON}\n```");
        assert!(parse_generated(&fenced).is_ok());
    }

    #[test]
    fn test_parse_generated_rejects_bad_shapes() {
        assert!(matches!(
            parse_generated("Sure! Here is your outfit."),
            Err(ClothingError::Parse(_))
        ));
        // Missing keys
        assert!(matches!(
            parse_generated(r#"{"headwear": ["Hat"], "overallAdvice": "x"}"#),
            Err(ClothingError::Parse(_))
        ));
        // Unknown keys
        let extra = VALID_JSON.replacen('{', r#"{"mood": "sunny","#, 1);
        assert!(matches!(parse_generated(&extra), Err(ClothingError::Parse(_))));
        // Empty content
        let empty = r#"{"headwear":[],"upperBody":[],"lowerBody":[],"footwear":[],
            "accessories":[],"specialConsiderations":[],"overallAdvice":"  "}"#;
        assert!(matches!(parse_generated(empty), Err(ClothingError::Empty)));
    }

    #[test]
    fn test_generated_strategy_used_when_valid() {
        let service = ClothingService::new(
            Arc::new(ScriptedGenerator(Ok(VALID_JSON.to_string()))),
            Arc::new(ScriptedImages::new(vec![])),
        );
        let advice = service.recommend(&profile(), &conditions(8.0, 40.0));
        assert_eq!(advice.source, ClothingSource::Generated);
        assert_eq!(advice.recommendation.headwear, vec!["Bucket hat"]);
    }

    #[test]
    fn test_provider_error_falls_back_to_rules() {
        let service = ClothingService::new(
            Arc::new(ScriptedGenerator(Err(ProviderError::Timeout(30)))),
            Arc::new(ScriptedImages::new(vec![])),
        );
        let advice = service.recommend(&profile(), &conditions(8.0, 170.0));
        assert_eq!(advice.source, ClothingSource::RuleBased);
        let rec = &advice.recommendation;
        assert!(rec.headwear.iter().any(|h| h == WIDE_BRIM_HAT));
        assert!(rec.accessories.iter().any(|a| a == RESPIRATOR_MASK));
        assert!(rec.footwear.iter().any(|f| f == WALKING_SHOES));
        assert!(!rec.overall_advice.is_empty());
    }

    #[test]
    fn test_malformed_generation_falls_back_to_rules() {
        let service = ClothingService::new(
            Arc::new(ScriptedGenerator(Ok("{\"headwear\": [".to_string()))),
            Arc::new(ScriptedImages::new(vec![])),
        );
        let profile = profile();
        let conditions = conditions(4.0, 20.0);
        let advice = service.recommend(&profile, &conditions);
        assert_eq!(advice.source, ClothingSource::RuleBased);
        assert_eq!(advice.recommendation, compose_for(&profile, &conditions));
    }

    #[test]
    fn test_images_use_item_phrase_then_fallbacks() {
        let images = ScriptedImages::new(vec!["sun hat", "linen shirt"]);
        let mut rec = parse_generated(VALID_JSON).expect("Should parse");
        attach_images(&images, &mut rec);

        let attached = rec.images.as_ref().expect("Should attach images");
        // Accessories are empty and get no entry
        assert_eq!(attached.len(), 4);
        assert!(!attached.contains_key(&ClothingCategory::Accessories));

        // "Bucket hat" derives "sun hat", found first time
        assert_eq!(
            attached[&ClothingCategory::Headwear][0].url,
            "https://images.example/sun-hat"
        );
        // "Linen shirt" derives "long sleeve shirt", which misses; second fallback hits
        assert_eq!(
            attached[&ClothingCategory::UpperBody][0].url,
            "https://images.example/linen-shirt"
        );
        // Nothing found for footwear
        assert_eq!(
            attached[&ClothingCategory::Footwear][0],
            ClothingCategory::Footwear.placeholder()
        );

        let queries = images.queries.lock().expect("Should lock");
        assert!(queries.iter().any(|q| q == "long sleeve shirt"));
    }

    #[test]
    fn test_images_never_fail() {
        let service = ClothingService::new(
            Arc::new(ScriptedGenerator(Err(ProviderError::NotConfigured(
                "OpenRouter".to_string(),
            )))),
            Arc::new(ScriptedImages::new(vec![])),
        );
        let advice = service.recommend_with_images(&profile(), &conditions(9.0, 30.0));
        let attached = advice
            .recommendation
            .images
            .as_ref()
            .expect("Should attach images");
        for category in advice.recommendation.non_empty_categories() {
            assert_eq!(attached[&category], vec![category.placeholder()]);
        }
    }
}
