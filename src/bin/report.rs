//! One-shot AtmosGuard report as JSON.
//!
//! Prints today's dashboard for a stored profile, optionally with a clothing
//! recommendation and prose advice, without starting the TUI.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin atmosguard-report -- [--profile <id>] [--clothing] [--advice]
//! ```
//!
//! Logs go to stderr so stdout stays valid JSON.

use std::env;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atmosguard::adapters::http::HttpClient;
use atmosguard::adapters::open_meteo::OpenMeteoClient;
use atmosguard::adapters::openrouter::OpenRouterClient;
use atmosguard::adapters::sanitize::SanitizingMakeWriter;
use atmosguard::adapters::sqlite::SqliteProfileStore;
use atmosguard::adapters::unsplash::UnsplashClient;
use atmosguard::application::{
    AdviceChatService, ClothingAdvice, ClothingService, Dashboard, DashboardService,
    PersonalizedAdvice,
};
use atmosguard::domain::{Conditions, UserProfile};
use atmosguard::ports::TextGenerator;
use atmosguard::AppConfig;

#[derive(Debug, Default)]
struct Args {
    profile: Option<String>,
    clothing: bool,
    advice: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    dashboard: Dashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    clothing: Option<ClothingAdvice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advice: Option<PersonalizedAdvice>,
}

fn usage() -> String {
    "Usage: atmosguard-report [--profile <id>] [--clothing] [--advice]".to_string()
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--profile" => {
                let v = args.next().ok_or_else(usage)?;
                parsed.profile = Some(v.trim().to_string());
            }
            "--clothing" => parsed.clothing = true,
            "--advice" => parsed.advice = true,
            _ => return Err(usage()),
        }
    }

    Ok(parsed)
}

/// Prose advice for the report, or `None` with a warning when it cannot be
/// produced. The rest of the report is still printed.
fn optional_advice<G: TextGenerator>(
    chat: &AdviceChatService<G>,
    profile: &UserProfile,
    conditions: &Conditions,
) -> Option<PersonalizedAdvice> {
    match chat.personalized_advice(profile, conditions) {
        Ok(advice) => Some(advice),
        Err(e) => {
            tracing::warn!("Skipping advice: {}", e);
            None
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args().map_err(anyhow::Error::msg)?;

    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let mut config = AppConfig::from_env();
    if args.profile.is_some() {
        config.profile_id = args.profile.clone();
    }

    let store = Arc::new(SqliteProfileStore::new(&config.db_path)?);
    let meteo = Arc::new(OpenMeteoClient::new(HttpClient::new(config.weather_timeout)?));
    let generator = Arc::new(OpenRouterClient::new(
        HttpClient::new(config.generation_timeout)?,
        config.openrouter_api_key.clone(),
        &config.openrouter_base_url,
        &config.chat_model,
    ));

    let dashboards = DashboardService::new(store, meteo.clone(), meteo);
    let profile = dashboards.open_profile(config.profile_id.as_deref())?;
    let conditions = dashboards.conditions_for(&profile);

    let clothing = if args.clothing {
        let images = Arc::new(UnsplashClient::new(
            HttpClient::new(config.image_timeout)?,
            config.unsplash_access_key.clone(),
        ));
        let service = ClothingService::new(generator.clone(), images);
        Some(service.recommend_with_images(&profile, &conditions))
    } else {
        None
    };

    let advice = if args.advice {
        optional_advice(&AdviceChatService::new(generator), &profile, &conditions)
    } else {
        None
    };

    let report = Report {
        dashboard: Dashboard::assemble(profile, conditions),
        clothing,
        advice,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use atmosguard::application::gateway::synthetic_snapshot;
    use atmosguard::domain::Location;
    use atmosguard::ports::{GenerationRequest, ProviderError};

    struct Canned;

    impl TextGenerator for Canned {
        fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            Ok("Wear SPF 50.".to_string())
        }
    }

    #[test]
    fn test_advice_without_location_is_skipped() {
        let chat = AdviceChatService::new(Arc::new(Canned));
        let conditions = Conditions::assess(synthetic_snapshot());

        let guest = UserProfile::new("Guest");
        assert!(optional_advice(&chat, &guest, &conditions).is_none());

        let mut located = UserProfile::new("Ada");
        located.preferred_location = Some(Location::new("Lisbon", 38.72, -9.14));
        let advice = optional_advice(&chat, &located, &conditions).expect("Should advise");
        assert_eq!(advice.advice, "Wear SPF 50.");
    }
}
