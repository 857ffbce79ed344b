//! UV and air-quality risk classification.
//!
//! Both classifiers are table-driven. Band upper bounds are inclusive and
//! strictly increasing, so a higher index never maps to a lower severity.
//! Missing, non-numeric or negative inputs classify as the lowest band.

use serde::Serialize;

use super::environment::AqiScale;

/// UV risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.band().label
    }

    fn band(&self) -> &'static UvBand {
        &UV_BANDS[*self as usize]
    }
}

impl std::fmt::Display for UvLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

struct UvBand {
    upper: f64,
    level: UvLevel,
    label: &'static str,
    color: &'static str,
    risk: &'static str,
    protection: &'static str,
}

const UV_BANDS: [UvBand; 5] = [
    UvBand {
        upper: 2.0,
        level: UvLevel::Low,
        label: "Low",
        color: "#10b981",
        risk: "Low risk from UV rays",
        protection: "Wear sunglasses on bright days. If outside for more than 1 hour, cover up and use sunscreen.",
    },
    UvBand {
        upper: 5.0,
        level: UvLevel::Moderate,
        label: "Moderate",
        color: "#f59e0b",
        risk: "Moderate risk of harm",
        protection: "Stay in shade near midday. Wear protective clothing, a wide-brimmed hat, and UV-blocking sunglasses. Apply sunscreen SPF 30+ every 2 hours.",
    },
    UvBand {
        upper: 7.0,
        level: UvLevel::High,
        label: "High",
        color: "#f97316",
        risk: "High risk of harm",
        protection: "Reduce time in the sun between 10 AM and 4 PM. Wear protective clothing, a wide-brimmed hat, and UV-blocking sunglasses. Apply sunscreen SPF 30+ every 2 hours.",
    },
    UvBand {
        upper: 10.0,
        level: UvLevel::VeryHigh,
        label: "Very High",
        color: "#ef4444",
        risk: "Very high risk of harm",
        protection: "Minimize exposure to the sun between 10 AM and 4 PM. Wear protective clothing, a wide-brimmed hat, and UV-blocking sunglasses. Apply sunscreen SPF 50+ every 2 hours.",
    },
    UvBand {
        upper: f64::INFINITY,
        level: UvLevel::Extreme,
        label: "Extreme",
        color: "#7f1d1d",
        risk: "Extreme risk of harm",
        protection: "Avoid being outside during midday hours. Wear full protective clothing, a wide-brimmed hat, and UV-blocking sunglasses. Apply sunscreen SPF 50+ every 1-2 hours.",
    },
];

/// Result of classifying a UV index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UvClassification {
    /// The index that was classified, after sanitizing.
    pub index: f64,
    pub level: UvLevel,
    pub label: &'static str,
    pub color: &'static str,
    pub risk: &'static str,
    /// Full protective-action text.
    pub protection: &'static str,
    /// `protection` split on sentence boundaries.
    pub protection_advice: Vec<String>,
}

/// Replace missing, NaN or negative readings with zero. Positive infinity
/// saturates to `f64::MAX` so it lands in the top band.
#[must_use]
pub fn sanitize_index(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v == f64::INFINITY => f64::MAX,
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Split a paragraph into sentences, dropping the terminal period.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(". ")
        .map(|s| s.trim().trim_end_matches('.').trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify a UV index.
#[must_use]
pub fn classify_uv(index: f64) -> UvClassification {
    let index = sanitize_index(Some(index));
    let band = UV_BANDS
        .iter()
        .find(|b| index <= b.upper)
        .unwrap_or(&UV_BANDS[UV_BANDS.len() - 1]);

    UvClassification {
        index,
        level: band.level,
        label: band.label,
        color: band.color,
        risk: band.risk,
        protection: band.protection,
        protection_advice: split_sentences(band.protection),
    }
}

struct AqiBand {
    upper: f64,
    level: &'static str,
    color: &'static str,
    description: &'static str,
    recommendation: &'static str,
}

const US_AQI_BANDS: [AqiBand; 6] = [
    AqiBand {
        upper: 50.0,
        level: "Good",
        color: "#10b981",
        description: "Air quality is satisfactory",
        recommendation: "Air quality is ideal for outdoor activities.",
    },
    AqiBand {
        upper: 100.0,
        level: "Moderate",
        color: "#f59e0b",
        description: "Air quality is acceptable",
        recommendation: "Unusually sensitive people should consider limiting prolonged outdoor exertion.",
    },
    AqiBand {
        upper: 150.0,
        level: "Unhealthy for Sensitive Groups",
        color: "#f97316",
        description: "Members of sensitive groups may experience health effects",
        recommendation: "Active children and adults, and people with respiratory disease should limit prolonged outdoor exertion.",
    },
    AqiBand {
        upper: 200.0,
        level: "Unhealthy",
        color: "#ef4444",
        description: "Everyone may begin to experience health effects",
        recommendation: "Everyone may begin to experience health effects. Sensitive groups should avoid outdoor activity.",
    },
    AqiBand {
        upper: 300.0,
        level: "Very Unhealthy",
        color: "#7f1d1d",
        description: "Health warnings of emergency conditions",
        recommendation: "Everyone should avoid all outdoor exertion.",
    },
    AqiBand {
        upper: f64::INFINITY,
        level: "Hazardous",
        color: "#4c0519",
        description: "Health alert: everyone may experience serious health effects",
        recommendation: "Remain indoors and keep activity levels low.",
    },
];

const EUROPEAN_AQI_BANDS: [AqiBand; 6] = [
    AqiBand {
        upper: 20.0,
        level: "Good",
        color: "#10b981",
        description: "Air quality is good",
        recommendation: "Ideal air quality for outdoor activities.",
    },
    AqiBand {
        upper: 40.0,
        level: "Fair",
        color: "#f59e0b",
        description: "Air quality is fair",
        recommendation: "Generally acceptable for most people.",
    },
    AqiBand {
        upper: 60.0,
        level: "Moderate",
        color: "#f97316",
        description: "Air quality is moderate",
        recommendation: "Sensitive individuals should limit outdoor activities.",
    },
    AqiBand {
        upper: 80.0,
        level: "Poor",
        color: "#ef4444",
        description: "Air quality is poor",
        recommendation: "Everyone may start to experience health effects.",
    },
    AqiBand {
        upper: 100.0,
        level: "Very Poor",
        color: "#7f1d1d",
        description: "Air quality is very poor",
        recommendation: "Health alert - avoid outdoor activities.",
    },
    AqiBand {
        upper: f64::INFINITY,
        level: "Extremely Poor",
        color: "#4c0519",
        description: "Air quality is hazardous",
        recommendation: "Health emergency - stay indoors.",
    },
];

/// Tier at which sensitive groups are affected (US "Unhealthy for Sensitive
/// Groups", European "Moderate").
pub const AQI_SENSITIVE_TIER: u8 = 3;

/// Tier at which everyone is affected (US "Unhealthy", European "Poor").
pub const AQI_UNHEALTHY_TIER: u8 = 4;

/// Result of classifying an AQI value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiClassification {
    pub value: f64,
    pub scale: AqiScale,
    /// Ordinal severity, 1 (best) to 6 (worst), comparable across scales.
    pub tier: u8,
    pub level: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

impl AqiClassification {
    /// Whether sensitive groups should take precautions.
    #[must_use]
    pub fn affects_sensitive_groups(&self) -> bool {
        self.tier >= AQI_SENSITIVE_TIER
    }
}

/// Classify an AQI value on the given scale.
#[must_use]
pub fn classify_aqi(aqi: f64, scale: AqiScale) -> AqiClassification {
    let value = sanitize_index(Some(aqi));
    let bands = match scale {
        AqiScale::Us => &US_AQI_BANDS,
        AqiScale::European => &EUROPEAN_AQI_BANDS,
    };
    let position = bands
        .iter()
        .position(|b| value <= b.upper)
        .unwrap_or(bands.len() - 1);
    let band = &bands[position];

    AqiClassification {
        value,
        scale,
        tier: (position + 1) as u8,
        level: band.level,
        color: band.color,
        description: band.description,
        recommendation: band.recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_bands() {
        assert_eq!(classify_uv(0.0).level, UvLevel::Low);
        assert_eq!(classify_uv(2.0).level, UvLevel::Low);
        assert_eq!(classify_uv(2.01).level, UvLevel::Moderate);
        assert_eq!(classify_uv(5.0).level, UvLevel::Moderate);
        assert_eq!(classify_uv(5.5).level, UvLevel::High);
        assert_eq!(classify_uv(7.0).level, UvLevel::High);
        assert_eq!(classify_uv(7.1).level, UvLevel::VeryHigh);
        assert_eq!(classify_uv(10.0).level, UvLevel::VeryHigh);
        assert_eq!(classify_uv(10.5).level, UvLevel::Extreme);
        assert_eq!(classify_uv(10.5).label, "Extreme");
    }

    #[test]
    fn test_uv_monotonic() {
        let mut previous = UvLevel::Low;
        let mut v = 0.0;
        while v <= 14.0 {
            let level = classify_uv(v).level;
            assert!(level >= previous, "UV {v} regressed to {level:?}");
            previous = level;
            v += 0.05;
        }
        assert_eq!(previous, UvLevel::Extreme);
    }

    #[test]
    fn test_uv_invalid_input_is_low() {
        assert_eq!(classify_uv(f64::NAN).level, UvLevel::Low);
        assert_eq!(classify_uv(f64::NEG_INFINITY).level, UvLevel::Low);
        assert_eq!(classify_uv(-3.0).level, UvLevel::Low);
        assert_eq!(sanitize_index(None), 0.0);
    }

    #[test]
    fn test_uv_infinity_is_extreme() {
        assert_eq!(classify_uv(f64::INFINITY).level, UvLevel::Extreme);
        assert_eq!(classify_uv(1e300).level, UvLevel::Extreme);
        assert_eq!(classify_aqi(f64::INFINITY, AqiScale::Us).tier, 6);
    }

    #[test]
    fn test_uv_protection_advice_split() {
        let c = classify_uv(6.0);
        assert_eq!(
            c.protection_advice,
            vec![
                "Reduce time in the sun between 10 AM and 4 PM",
                "Wear protective clothing, a wide-brimmed hat, and UV-blocking sunglasses",
                "Apply sunscreen SPF 30+ every 2 hours",
            ]
        );
    }

    #[test]
    fn test_every_band_splits_into_whole_sentences() {
        let expected = [(1.0, 2), (4.0, 3), (6.0, 3), (9.0, 3), (12.0, 3)];
        for (index, count) in expected {
            let c = classify_uv(index);
            assert_eq!(c.protection_advice.len(), count, "band {}", c.label);
            for sentence in &c.protection_advice {
                assert!(
                    sentence.chars().next().is_some_and(char::is_uppercase),
                    "fragment {sentence:?} in band {}",
                    c.label
                );
                assert!(!sentence.ends_with('.'));
            }
        }
    }

    #[test]
    fn test_uv_classification_is_deterministic() {
        let a = serde_json::to_string(&classify_uv(8.4)).expect("Should serialize");
        let b = serde_json::to_string(&classify_uv(8.4)).expect("Should serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn test_us_aqi_bands() {
        let cases = [
            (0.0, 1, "Good"),
            (50.0, 1, "Good"),
            (51.0, 2, "Moderate"),
            (100.0, 2, "Moderate"),
            (150.0, 3, "Unhealthy for Sensitive Groups"),
            (150.5, 4, "Unhealthy"),
            (200.0, 4, "Unhealthy"),
            (300.0, 5, "Very Unhealthy"),
            (301.0, 6, "Hazardous"),
        ];
        for (value, tier, level) in cases {
            let c = classify_aqi(value, AqiScale::Us);
            assert_eq!(c.tier, tier, "AQI {value}");
            assert_eq!(c.level, level, "AQI {value}");
        }
    }

    #[test]
    fn test_us_aqi_monotonic() {
        let mut previous = 1;
        for v in 0..=400 {
            let tier = classify_aqi(f64::from(v), AqiScale::Us).tier;
            assert!(tier >= previous);
            previous = tier;
        }
        assert_eq!(previous, 6);
    }

    #[test]
    fn test_european_aqi_bands() {
        assert_eq!(classify_aqi(20.0, AqiScale::European).level, "Good");
        assert_eq!(classify_aqi(21.0, AqiScale::European).level, "Fair");
        assert_eq!(classify_aqi(60.0, AqiScale::European).level, "Moderate");
        assert_eq!(classify_aqi(80.0, AqiScale::European).tier, 4);
        assert_eq!(classify_aqi(100.0, AqiScale::European).level, "Very Poor");
        assert_eq!(classify_aqi(140.0, AqiScale::European).level, "Extremely Poor");
    }

    #[test]
    fn test_aqi_invalid_input_is_good() {
        let c = classify_aqi(f64::NAN, AqiScale::Us);
        assert_eq!(c.tier, 1);
        assert_eq!(c.level, "Good");
        assert!(!c.affects_sensitive_groups());
    }
}
