//! Runtime configuration from environment variables.
//!
//! Every setting has a default. Unparseable values are logged and ignored so
//! a typo never prevents startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::openrouter::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_DB_PATH: &str = "atmosguard.db";
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 5;

/// Application settings.
#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Profile to open; the first stored profile when unset.
    pub profile_id: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub chat_model: String,
    pub unsplash_access_key: Option<String>,
    /// Weather, air quality and geocoding.
    pub weather_timeout: Duration,
    pub generation_timeout: Duration,
    pub image_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("profile_id", &self.profile_id)
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("chat_model", &self.chat_model)
            .field("unsplash_access_key", &redact(&self.unsplash_access_key))
            .field("weather_timeout", &self.weather_timeout)
            .field("generation_timeout", &self.generation_timeout)
            .field("image_timeout", &self.image_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            profile_id: None,
            openrouter_api_key: None,
            openrouter_base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            unsplash_access_key: None,
            weather_timeout: Duration::from_secs(DEFAULT_WEATHER_TIMEOUT_SECS),
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            image_timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Load settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |key: &str, default: Duration| match get(key) {
            None => default,
            Some(raw) => match raw.parse::<u64>() {
                Ok(v) if v > 0 => Duration::from_secs(v),
                _ => {
                    tracing::warn!("Ignoring invalid {}={:?}", key, raw);
                    default
                }
            },
        };

        let defaults = Self::default();
        Self {
            db_path: get("ATMOSGUARD_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            profile_id: get("ATMOSGUARD_PROFILE_ID"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openrouter_base_url),
            chat_model: get("ATMOSGUARD_CHAT_MODEL").unwrap_or(defaults.chat_model),
            unsplash_access_key: get("UNSPLASH_ACCESS_KEY"),
            weather_timeout: secs("ATMOSGUARD_WEATHER_TIMEOUT_SECS", defaults.weather_timeout),
            generation_timeout: secs(
                "ATMOSGUARD_GENERATION_TIMEOUT_SECS",
                defaults.generation_timeout,
            ),
            image_timeout: secs("ATMOSGUARD_IMAGE_TIMEOUT_SECS", defaults.image_timeout),
        }
    }

    /// Whether text generation can be attempted at all.
    #[must_use]
    pub fn generation_enabled(&self) -> bool {
        self.openrouter_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.db_path, PathBuf::from("atmosguard.db"));
        assert_eq!(cfg.openrouter_base_url, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.weather_timeout, Duration::from_secs(10));
        assert_eq!(cfg.generation_timeout, Duration::from_secs(30));
        assert_eq!(cfg.image_timeout, Duration::from_secs(5));
        assert!(!cfg.generation_enabled());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("ATMOSGUARD_DB_PATH", "/tmp/guard.db"),
            ("OPENROUTER_API_KEY", "sk-or-test"),
            ("OPENROUTER_BASE_URL", "http://localhost:8080/v1/"),
            ("ATMOSGUARD_IMAGE_TIMEOUT_SECS", "2"),
        ]);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/guard.db"));
        assert_eq!(cfg.openrouter_base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.image_timeout, Duration::from_secs(2));
        assert!(cfg.generation_enabled());
    }

    #[test]
    fn test_invalid_values_ignored() {
        let cfg = config(&[
            ("ATMOSGUARD_WEATHER_TIMEOUT_SECS", "ten"),
            ("ATMOSGUARD_GENERATION_TIMEOUT_SECS", "0"),
            ("UNSPLASH_ACCESS_KEY", "   "),
        ]);
        assert_eq!(cfg.weather_timeout, Duration::from_secs(10));
        assert_eq!(cfg.generation_timeout, Duration::from_secs(30));
        assert!(cfg.unsplash_access_key.is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let cfg = config(&[("OPENROUTER_API_KEY", "sk-or-secret-value")]);
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("sk-or-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }
}
