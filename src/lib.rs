//! # AtmosGuard
//!
//! Personalized sun-protection advice.
//!
//! This crate provides:
//! - UV and air-quality risk classification
//! - Ordered, profile-aware protection advice
//! - Clothing recommendations, generated or rule-based, with illustrative images
//! - A terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (profiles, snapshots, classifiers, composers)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (Open-Meteo, OpenRouter, Unsplash, SQLite)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Runtime settings from the environment
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::AppConfig;
pub use domain::{ClothingRecommendation, EnvironmentalSnapshot, UserProfile};

/// Result type for AtmosGuard operations
pub type Result<T> = std::result::Result<T, AtmosguardError>;

/// Main error type for AtmosGuard
#[derive(Debug, thiserror::Error)]
pub enum AtmosguardError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Invalid profile data: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Precondition(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ports::ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AtmosguardError {
    /// Messages suitable for showing to the user.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}
