//! User skin profile types.
//!
//! Skin type and skin condition are closed enums: unknown values are rejected
//! when a profile change is validated, so the advice rules never see them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length of a display name (characters, after trimming).
pub const MAX_NAME_LEN: usize = 50;

/// Valid age range (inclusive).
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

const AGE_MESSAGE: &str = "Please enter a valid age (1-120)";

/// Fitzpatrick skin phototype.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkinType {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl SkinType {
    pub const ALL: [SkinType; 6] = [
        SkinType::I,
        SkinType::II,
        SkinType::III,
        SkinType::IV,
        SkinType::V,
        SkinType::VI,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
            Self::VI => "VI",
        }
    }

    /// Burn/tan behaviour for this phototype.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::I => "Very fair - always burns, never tans",
            Self::II => "Fair - usually burns, tans minimally",
            Self::III => "Medium - sometimes burns, gradually tans",
            Self::IV => "Olive - rarely burns, tans easily",
            Self::V => "Brown - very rarely burns, tans very easily",
            Self::VI => "Dark - never burns, deeply pigmented",
        }
    }

    /// Types I and II.
    #[must_use]
    pub fn is_fair(&self) -> bool {
        matches!(self, Self::I | Self::II)
    }

    /// Types V and VI.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::V | Self::VI)
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown skin type '{}' (expected I-VI)", s.trim()))
    }
}

/// Dermatological condition relevant to sun protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinCondition {
    Normal,
    Eczema,
    Psoriasis,
    Vitiligo,
    SkinCancer,
    Lupus,
    Other,
}

impl SkinCondition {
    pub const ALL: [SkinCondition; 7] = [
        SkinCondition::Normal,
        SkinCondition::Eczema,
        SkinCondition::Psoriasis,
        SkinCondition::Vitiligo,
        SkinCondition::SkinCancer,
        SkinCondition::Lupus,
        SkinCondition::Other,
    ];

    /// Storage/wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Eczema => "eczema",
            Self::Psoriasis => "psoriasis",
            Self::Vitiligo => "vitiligo",
            Self::SkinCancer => "skin_cancer",
            Self::Lupus => "lupus",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Eczema => "Eczema",
            Self::Psoriasis => "Psoriasis",
            Self::Vitiligo => "Vitiligo",
            Self::SkinCancer => "Skin cancer",
            Self::Lupus => "Lupus",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for SkinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown skin condition '{}'", s.trim()))
    }
}

/// A named place with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Validate name and coordinate ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Location name is required".to_string());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            errors.push(format!("Latitude {} out of range [-90, 90]", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            errors.push(format!(
                "Longitude {} out of range [-180, 180]",
                self.longitude
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Age bracket used by the advice rules. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    /// Under 18
    Child,
    /// 18 to 30
    YoungAdult,
    /// 31 to 60
    Adult,
    /// Over 60
    Senior,
}

/// Stored user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub skin_type: Option<SkinType>,
    pub skin_condition: Option<SkinCondition>,
    pub has_skin_cancer_history: bool,
    pub preferred_location: Option<Location>,
    pub onboarding_completed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserProfile {
    /// Create a fresh profile with a random identifier and no skin data.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: new_profile_id(),
            name: name.into(),
            email: None,
            age: None,
            skin_type: None,
            skin_condition: None,
            has_skin_cancer_history: false,
            preferred_location: None,
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Age bracket, or `None` when the age is unset or outside 1-120.
    #[must_use]
    pub fn age_bracket(&self) -> Option<AgeBracket> {
        let age = i64::from(self.age?);
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return None;
        }
        Some(match age {
            a if a < 18 => AgeBracket::Child,
            a if a <= 30 => AgeBracket::YoungAdult,
            a if a <= 60 => AgeBracket::Adult,
            _ => AgeBracket::Senior,
        })
    }

    /// Coordinates of the preferred location, if one is set.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.preferred_location
            .as_ref()
            .map(|l| (l.latitude, l.longitude))
    }

    /// Apply validated changes and bump `updated_at`.
    pub fn apply(&mut self, changes: &ProfileChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(age) = changes.age {
            self.age = Some(age);
        }
        if let Some(skin_type) = changes.skin_type {
            self.skin_type = Some(skin_type);
        }
        if let Some(condition) = changes.skin_condition {
            self.skin_condition = Some(condition);
        }
        if let Some(history) = changes.has_skin_cancer_history {
            self.has_skin_cancer_history = history;
        }
        match &changes.location {
            Some(LocationChange::Set(location)) => {
                self.preferred_location = Some(location.clone());
            }
            Some(LocationChange::Clear) => self.preferred_location = None,
            None => {}
        }
        if let Some(done) = changes.onboarding_completed {
            self.onboarding_completed = done;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Requested change to the preferred location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationChange {
    Set(Location),
    Clear,
}

/// Partial profile update as submitted by a user (raw, unvalidated).
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub skin_type: Option<String>,
    pub skin_condition: Option<String>,
    pub has_skin_cancer_history: Option<bool>,
    pub location: Option<LocationChange>,
}

/// Onboarding submission (raw, unvalidated). Skin type, condition and age
/// are required.
#[derive(Debug, Clone, Default)]
pub struct OnboardingRequest {
    pub skin_type: Option<String>,
    pub skin_condition: Option<String>,
    pub age: Option<i64>,
    pub has_skin_cancer_history: bool,
    pub location: Option<Location>,
}

/// Validated, typed profile changes ready to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub skin_type: Option<SkinType>,
    pub skin_condition: Option<SkinCondition>,
    pub has_skin_cancer_history: Option<bool>,
    pub location: Option<LocationChange>,
    pub onboarding_completed: Option<bool>,
}

fn validate_age(age: i64, errors: &mut Vec<String>) -> Option<u8> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        u8::try_from(age).ok()
    } else {
        errors.push(AGE_MESSAGE.to_string());
        None
    }
}

fn parse_field<T>(raw: &str, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr<Err = String>,
{
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

impl ProfileUpdate {
    /// Validate the update.
    ///
    /// Empty strings are treated as "not provided", matching form semantics.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<ProfileChanges, Vec<String>> {
        let mut errors = Vec::new();
        let mut changes = ProfileChanges::default();

        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if name.chars().count() > MAX_NAME_LEN {
                errors.push(format!("Name must be at most {MAX_NAME_LEN} characters"));
            } else {
                changes.name = Some(name.to_string());
            }
        }
        if let Some(age) = self.age {
            changes.age = validate_age(age, &mut errors);
        }
        if let Some(raw) = self.skin_type.as_deref().filter(|s| !s.trim().is_empty()) {
            changes.skin_type = parse_field(raw, &mut errors);
        }
        if let Some(raw) = self.skin_condition.as_deref().filter(|s| !s.trim().is_empty()) {
            changes.skin_condition = parse_field(raw, &mut errors);
        }
        changes.has_skin_cancer_history = self.has_skin_cancer_history;

        match &self.location {
            Some(LocationChange::Set(location)) => match location.validate() {
                Ok(()) => changes.location = Some(LocationChange::Set(location.clone())),
                Err(mut e) => errors.append(&mut e),
            },
            Some(LocationChange::Clear) => changes.location = Some(LocationChange::Clear),
            None => {}
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

impl OnboardingRequest {
    /// Validate the onboarding submission.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<ProfileChanges, Vec<String>> {
        let skin_type = self.skin_type.as_deref().filter(|s| !s.trim().is_empty());
        let skin_condition = self.skin_condition.as_deref().filter(|s| !s.trim().is_empty());
        let (Some(skin_type), Some(skin_condition), Some(age)) = (skin_type, skin_condition, self.age)
        else {
            return Err(vec!["Please fill in all required fields".to_string()]);
        };

        let mut errors = Vec::new();
        let changes = ProfileChanges {
            name: None,
            age: validate_age(age, &mut errors),
            skin_type: parse_field(skin_type, &mut errors),
            skin_condition: parse_field(skin_condition, &mut errors),
            has_skin_cancer_history: Some(self.has_skin_cancer_history),
            location: match &self.location {
                Some(location) => match location.validate() {
                    Ok(()) => Some(LocationChange::Set(location.clone())),
                    Err(mut e) => {
                        errors.append(&mut e);
                        None
                    }
                },
                None => None,
            },
            onboarding_completed: Some(true),
        };

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// Generate a random UUID v4 string from a ChaCha20 CSPRNG.
#[must_use]
pub fn new_profile_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
