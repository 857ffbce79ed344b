//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (weather and air-quality
//! services, text generation, image search, storage).

mod environment;
mod generation;
mod images;
mod provider;
mod storage;

pub use environment::{AirQualityProvider, Geocoder, WeatherProvider};
pub use generation::{ChatMessage, GenerationRequest, ResponseFormat, Role, TextGenerator};
pub use images::ImageSearch;
pub use provider::ProviderError;
pub use storage::ProfileStore;
