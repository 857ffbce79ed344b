//! Dashboard service: profile lifecycle and dashboard assembly.
//!
//! This service coordinates:
//! - Profile lookup, creation, onboarding and partial updates
//! - Environmental data for the profile's location (synthetic without one)
//! - Risk classification and daily advice for the dashboard payload

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::StorageError;
use crate::application::gateway::{synthetic_snapshot, AggregationGateway};
use crate::domain::{
    compose_advice, AqiClassification, Conditions, EnvironmentalSnapshot, Location,
    OnboardingRequest, PollutantComponents, ProfileUpdate, UserProfile, UvClassification,
};
use crate::domain::profile::MAX_NAME_LEN;
use crate::ports::{AirQualityProvider, Geocoder, ProfileStore, WeatherProvider};
use crate::AtmosguardError;

/// Name given to a profile created without one.
pub const DEFAULT_PROFILE_NAME: &str = "Guest";

/// Shown when a profile has no preferred location.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Kind of a recent-activity line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UvAlert,
    AqiAlert,
    Profile,
    Weather,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub time: String,
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: UserProfile,
    pub weather: EnvironmentalSnapshot,
    pub uv: UvClassification,
    pub air_quality: AqiClassification,
    pub pollutants: PollutantComponents,
    pub location: String,
    pub location_coords: Option<Coordinates>,
    pub daily_tips: Vec<String>,
    pub recent_activities: Vec<Activity>,
    /// Whole days since the profile was created.
    pub days_protected: i64,
    pub data_fetched: bool,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl Dashboard {
    /// Assemble the payload for a profile and classified conditions.
    #[must_use]
    pub fn assemble(profile: UserProfile, conditions: Conditions) -> Self {
        let now = chrono::Utc::now();
        let Conditions { snapshot, uv, aqi } = conditions;

        let daily_tips = compose_advice(&profile, &snapshot);
        let recent_activities = recent_activities(&profile, &snapshot, &uv, &aqi);
        let location = profile
            .preferred_location
            .as_ref()
            .map_or_else(|| UNKNOWN_LOCATION.to_string(), |l| l.name.clone());
        let location_coords = profile
            .coordinates()
            .map(|(lat, lon)| Coordinates { lat, lon });
        let days_protected = (now - profile.created_at).num_days().max(0);

        Self {
            location,
            location_coords,
            daily_tips,
            recent_activities,
            days_protected,
            data_fetched: snapshot.fetched,
            last_updated: now,
            pollutants: snapshot.components.clone(),
            weather: snapshot,
            uv,
            air_quality: aqi,
            user: profile,
        }
    }
}

fn recent_activities(
    profile: &UserProfile,
    snapshot: &EnvironmentalSnapshot,
    uv: &UvClassification,
    aqi: &AqiClassification,
) -> Vec<Activity> {
    let today = "Today".to_string();
    vec![
        Activity {
            kind: ActivityKind::UvAlert,
            message: format!("UV Index is {:.1} ({})", uv.index, uv.label),
            time: today.clone(),
        },
        Activity {
            kind: ActivityKind::AqiAlert,
            message: format!("Air Quality: {}", aqi.level),
            time: today,
        },
        Activity {
            kind: ActivityKind::Profile,
            message: "Profile setup completed".to_string(),
            time: if profile.onboarding_completed {
                profile.updated_at.format("%Y-%m-%d").to_string()
            } else {
                "Pending".to_string()
            },
        },
        Activity {
            kind: ActivityKind::Weather,
            message: format!("Temperature: {:.0}°C", snapshot.temperature),
            time: "Updated just now".to_string(),
        },
    ]
}

/// Resolve a typed place name to a location.
///
/// # Errors
/// Returns `Validation` for a blank name and `Provider` when the lookup
/// fails or finds nothing.
pub fn resolve_location<G: Geocoder + ?Sized>(
    geocoder: &G,
    name: &str,
) -> Result<Location, AtmosguardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AtmosguardError::Validation(vec![
            "Please enter a city name".to_string(),
        ]));
    }
    let location = geocoder.geocode(name)?;
    tracing::info!("Resolved location: {}", location.name);
    Ok(location)
}

/// Service for profile management and dashboard assembly.
pub struct DashboardService<S, W, A>
where
    S: ProfileStore,
    W: WeatherProvider,
    A: AirQualityProvider,
{
    store: Arc<S>,
    gateway: AggregationGateway<W, A>,
}

impl<S, W, A> DashboardService<S, W, A>
where
    S: ProfileStore,
    S::Error: Into<StorageError>,
    W: WeatherProvider,
    A: AirQualityProvider,
{
    /// Create a new dashboard service.
    pub fn new(store: Arc<S>, weather: Arc<W>, air_quality: Arc<A>) -> Self {
        Self {
            store,
            gateway: AggregationGateway::new(weather, air_quality),
        }
    }

    /// Load a profile.
    ///
    /// # Errors
    /// Returns `NotFound` if no profile has this ID, or a storage error.
    pub fn profile(&self, id: &str) -> Result<UserProfile, AtmosguardError> {
        self.store
            .get(id)
            .map_err(|e| AtmosguardError::Storage(e.into()))?
            .ok_or_else(|| AtmosguardError::NotFound(id.to_string()))
    }

    /// Create and store a new profile.
    ///
    /// # Errors
    /// Returns `Validation` for an over-long name, or a storage error.
    pub fn create_profile(&self, name: &str) -> Result<UserProfile, AtmosguardError> {
        let name = match name.trim() {
            "" => DEFAULT_PROFILE_NAME,
            n if n.chars().count() > MAX_NAME_LEN => {
                return Err(AtmosguardError::Validation(vec![format!(
                    "Name must be at most {MAX_NAME_LEN} characters"
                )]));
            }
            n => n,
        };
        let profile = UserProfile::new(name);
        self.store
            .create(&profile)
            .map_err(|e| AtmosguardError::Storage(e.into()))?;
        tracing::info!("Created profile {}", profile.id);
        Ok(profile)
    }

    /// Open the requested profile, else the oldest stored one, else a new
    /// default profile.
    ///
    /// # Errors
    /// Returns `NotFound` if a requested ID does not exist, or a storage error.
    pub fn open_profile(&self, requested: Option<&str>) -> Result<UserProfile, AtmosguardError> {
        if let Some(id) = requested {
            return self.profile(id);
        }
        let existing = self
            .store
            .list()
            .map_err(|e| AtmosguardError::Storage(e.into()))?;
        match existing.into_iter().next() {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!("No stored profiles, creating a default one");
                self.create_profile(DEFAULT_PROFILE_NAME)
            }
        }
    }

    fn apply(
        &self,
        id: &str,
        changes: &crate::domain::ProfileChanges,
    ) -> Result<UserProfile, AtmosguardError> {
        self.store
            .update(id, changes)
            .map_err(|e| AtmosguardError::Storage(e.into()))?
            .ok_or_else(|| AtmosguardError::NotFound(id.to_string()))
    }

    /// Complete onboarding for a profile.
    ///
    /// # Errors
    /// Returns `Validation` with user-facing messages when required fields
    /// are missing or out of range; nothing is written in that case.
    pub fn complete_onboarding(
        &self,
        id: &str,
        request: &OnboardingRequest,
    ) -> Result<UserProfile, AtmosguardError> {
        let changes = request.validate().map_err(AtmosguardError::Validation)?;
        let profile = self.apply(id, &changes)?;
        tracing::info!("Onboarding completed for profile {}", profile.id);
        Ok(profile)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    /// Returns `Validation` with user-facing messages; nothing is written in
    /// that case.
    pub fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AtmosguardError> {
        let changes = update.validate().map_err(AtmosguardError::Validation)?;
        let profile = self.apply(id, &changes)?;
        tracing::info!("Profile {} updated", profile.id);
        Ok(profile)
    }

    /// Classified conditions at the profile's location, or fully synthetic
    /// conditions when no location is set.
    pub fn conditions_for(&self, profile: &UserProfile) -> Conditions {
        match profile.coordinates() {
            Some((lat, lon)) => self.gateway.fetch_conditions(lat, lon),
            None => {
                tracing::debug!("No location set, using synthetic conditions");
                Conditions::assess(synthetic_snapshot())
            }
        }
    }

    /// Build the dashboard for a stored profile.
    ///
    /// # Errors
    /// Returns `NotFound` or a storage error. Provider failures degrade to
    /// synthetic data instead.
    pub fn dashboard(&self, id: &str) -> Result<Dashboard, AtmosguardError> {
        let profile = self.profile(id)?;
        Ok(self.dashboard_for(profile))
    }

    /// Build the dashboard for an already-loaded profile.
    pub fn dashboard_for(&self, profile: UserProfile) -> Dashboard {
        let conditions = self.conditions_for(&profile);
        let dashboard = Dashboard::assemble(profile, conditions);
        tracing::info!(
            "Dashboard assembled (live data: {}, tips: {})",
            dashboard.data_fetched,
            dashboard.daily_tips.len()
        );
        dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteProfileStore;
    use crate::domain::{AirQualityReading, AqiScale, LocationChange, SkinType, WeatherReading};
    use crate::ports::ProviderError;

    struct SunnyWeather;

    impl WeatherProvider for SunnyWeather {
        fn current_weather(&self, _lat: f64, _lon: f64) -> Result<WeatherReading, ProviderError> {
            Ok(WeatherReading {
                temperature: 29.4,
                feels_like: 31.0,
                humidity: 75.0,
                wind_speed: 9.0,
                wind_direction: 45.0,
                weather_code: 0,
                uv_index: 8.3,
                is_day: true,
            })
        }
    }

    struct HazyAir;

    impl AirQualityProvider for HazyAir {
        fn current_air_quality(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<AirQualityReading, ProviderError> {
            Ok(AirQualityReading {
                aqi: 120.0,
                scale: AqiScale::Us,
                components: PollutantComponents {
                    pm2_5: Some(40.2),
                    ..PollutantComponents::default()
                },
            })
        }
    }

    struct FixedGeocoder;

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, name: &str) -> Result<Location, ProviderError> {
            if name.eq_ignore_ascii_case("lisbon") {
                Ok(Location::new("Lisbon, Lisbon, Portugal", 38.72, -9.14))
            } else {
                Err(ProviderError::NoResults(name.to_string()))
            }
        }
    }

    fn service() -> DashboardService<SqliteProfileStore, SunnyWeather, HazyAir> {
        let store = SqliteProfileStore::in_memory().expect("Should create in-memory store");
        DashboardService::new(Arc::new(store), Arc::new(SunnyWeather), Arc::new(HazyAir))
    }

    fn onboarding() -> OnboardingRequest {
        OnboardingRequest {
            skin_type: Some("II".to_string()),
            skin_condition: Some("eczema".to_string()),
            age: Some(34),
            has_skin_cancer_history: true,
            location: Some(Location::new("Lisbon", 38.72, -9.14)),
        }
    }

    #[test]
    fn test_open_profile_creates_default_once() {
        let service = service();
        let first = service.open_profile(None).expect("Should create");
        assert_eq!(first.name, DEFAULT_PROFILE_NAME);
        let again = service.open_profile(None).expect("Should reopen");
        assert_eq!(again.id, first.id);
        assert!(matches!(
            service.open_profile(Some("missing")),
            Err(AtmosguardError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_profile_rejects_long_name() {
        let service = service();
        let result = service.create_profile(&"x".repeat(51));
        assert!(matches!(result, Err(AtmosguardError::Validation(_))));
    }

    #[test]
    fn test_onboarding_validation_writes_nothing() {
        let service = service();
        let profile = service.create_profile("Ada").expect("Should create");

        let mut request = onboarding();
        request.age = Some(0);
        let Err(AtmosguardError::Validation(errors)) =
            service.complete_onboarding(&profile.id, &request)
        else {
            panic!("Should reject age 0");
        };
        assert_eq!(errors, vec!["Please enter a valid age (1-120)"]);

        let stored = service.profile(&profile.id).expect("Should load");
        assert!(!stored.onboarding_completed);
        assert!(stored.age.is_none());
    }

    #[test]
    fn test_onboarding_then_dashboard() {
        let service = service();
        let profile = service.create_profile("Ada").expect("Should create");
        let profile = service
            .complete_onboarding(&profile.id, &onboarding())
            .expect("Should onboard");
        assert!(profile.onboarding_completed);
        assert_eq!(profile.skin_type, Some(SkinType::II));

        let dashboard = service.dashboard(&profile.id).expect("Should assemble");
        assert!(dashboard.data_fetched);
        assert_eq!(dashboard.location, "Lisbon");
        assert_eq!(
            dashboard.location_coords,
            Some(Coordinates {
                lat: 38.72,
                lon: -9.14
            })
        );
        assert_eq!(dashboard.uv.label, "Very High");
        assert_eq!(dashboard.air_quality.tier, 3);
        assert_eq!(dashboard.pollutants.pm2_5, Some(40.2));
        assert!(!dashboard.daily_tips.is_empty() && dashboard.daily_tips.len() <= 5);
        assert_eq!(dashboard.recent_activities.len(), 4);
        assert_eq!(dashboard.recent_activities[0].message, "UV Index is 8.3 (Very High)");
        assert_eq!(dashboard.days_protected, 0);
    }

    #[test]
    fn test_dashboard_without_location_is_synthetic() {
        let service = service();
        let profile = service.create_profile("Ada").expect("Should create");
        let dashboard = service.dashboard(&profile.id).expect("Should assemble");
        assert!(!dashboard.data_fetched);
        assert_eq!(dashboard.location, UNKNOWN_LOCATION);
        assert!(dashboard.location_coords.is_none());
        assert_eq!(dashboard.recent_activities[2].time, "Pending");
    }

    #[test]
    fn test_update_profile_clears_location() {
        let service = service();
        let profile = service.create_profile("Ada").expect("Should create");
        service
            .complete_onboarding(&profile.id, &onboarding())
            .expect("Should onboard");

        let update = ProfileUpdate {
            name: Some("  Ada L.  ".to_string()),
            location: Some(LocationChange::Clear),
            ..ProfileUpdate::default()
        };
        let updated = service
            .update_profile(&profile.id, &update)
            .expect("Should update");
        assert_eq!(updated.name, "Ada L.");
        assert!(updated.preferred_location.is_none());
        // Untouched fields survive
        assert_eq!(updated.age, Some(34));
    }

    #[test]
    fn test_dashboard_serializes_camel_case() {
        let service = service();
        let profile = service.create_profile("Ada").expect("Should create");
        let dashboard = service.dashboard(&profile.id).expect("Should assemble");
        let json = serde_json::to_value(&dashboard).expect("Should serialize");
        assert!(json.get("dailyTips").is_some());
        assert!(json.get("airQuality").is_some());
        assert!(json["locationCoords"].is_null());
        assert_eq!(json["recentActivities"][0]["type"], "uv_alert");
    }

    #[test]
    fn test_resolve_location() {
        let location = resolve_location(&FixedGeocoder, "  Lisbon ").expect("Should resolve");
        assert_eq!(location.latitude, 38.72);
        assert!(matches!(
            resolve_location(&FixedGeocoder, "   "),
            Err(AtmosguardError::Validation(_))
        ));
        assert!(matches!(
            resolve_location(&FixedGeocoder, "Atlantis"),
            Err(AtmosguardError::Provider(ProviderError::NoResults(_)))
        ));
    }
}
