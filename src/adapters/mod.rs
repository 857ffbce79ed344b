//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external services:
//! - `open_meteo`: weather, UV, air quality and geocoding
//! - `openrouter`: chat-completion text generation
//! - `unsplash`: clothing image search
//! - `sqlite`: SQLite for local profile storage
//! - `sanitize`: PII filtering for logs

pub mod http;
pub mod open_meteo;
pub mod openrouter;
pub mod sanitize;
pub mod sqlite;
pub mod unsplash;

// Re-export storage error for lib.rs
pub use sqlite::StorageError;
