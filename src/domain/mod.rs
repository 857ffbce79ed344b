//! Domain layer: Core business types and logic.
//!
//! Everything here is pure: no I/O, no clocks beyond timestamps on new
//! records, no randomness outside identifier generation.

pub mod advice;
pub mod clothing;
pub mod conditions;
pub mod environment;
pub mod profile;
pub mod prompt;
pub mod risk;

pub use advice::compose_advice;
pub use clothing::{ClothingCategory, ClothingRecommendation, ImageRef};
pub use conditions::Conditions;
pub use environment::{
    AirQualityReading, AqiScale, EnvironmentalSnapshot, PollutantComponents, WeatherReading,
};
pub use profile::{
    Location, LocationChange, OnboardingRequest, ProfileChanges, ProfileUpdate, SkinCondition,
    SkinType, UserProfile,
};
pub use prompt::PromptContext;
pub use risk::{classify_aqi, classify_uv, AqiClassification, UvClassification, UvLevel};
