//! A snapshot together with its risk classifications.

use serde::Serialize;

use super::environment::EnvironmentalSnapshot;
use super::risk::{classify_aqi, classify_uv, AqiClassification, UvClassification};

/// Classified conditions for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub snapshot: EnvironmentalSnapshot,
    pub uv: UvClassification,
    pub aqi: AqiClassification,
}

impl Conditions {
    /// Classify a snapshot.
    #[must_use]
    pub fn assess(snapshot: EnvironmentalSnapshot) -> Self {
        let uv = classify_uv(snapshot.uv_index);
        let aqi = classify_aqi(snapshot.aqi, snapshot.aqi_scale);
        Self { snapshot, uv, aqi }
    }

    /// Whether the snapshot came entirely from live providers.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.snapshot.fetched
    }
}
