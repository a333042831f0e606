//! Risk classification for wind speed and forecast summaries

use crate::models::{RiskColor, WindRisk, WindSample};

/// Lower bound (m/s) of the moderate, strong and dangerous bands
pub const WIND_MODERATE_MS: f64 = 4.0;
pub const WIND_STRONG_MS: f64 = 8.0;
pub const WIND_DANGEROUS_MS: f64 = 12.0;

impl WindRisk {
    /// Classify a mean 10 m wind speed. Bands are closed below and open above.
    pub fn classify(speed: Option<f64>) -> Self {
        match speed {
            Some(s) if s.is_nan() => WindRisk::Unknown,
            Some(s) if s < WIND_MODERATE_MS => WindRisk::Low,
            Some(s) if s < WIND_STRONG_MS => WindRisk::Moderate,
            Some(s) if s < WIND_DANGEROUS_MS => WindRisk::Strong,
            Some(_) => WindRisk::Dangerous,
            None => WindRisk::Unknown,
        }
    }

    pub fn from_sample(sample: &WindSample) -> Self {
        Self::classify(sample.value())
    }
}

/// Ordered summary rules; the first rule with a matching keyword wins.
/// Feed summaries are in Malay, so each rule lists both languages.
const SUMMARY_RULES: &[(&[&str], RiskColor)] = &[
    (&["tiada hujan", "no rain", "clear"], RiskColor::Green),
    (&["ribut petir", "thunderstorm"], RiskColor::Red),
    (&["hujan", "rain"], RiskColor::Orange),
    (&["berangin", "windy"], RiskColor::Yellow),
    (&["jerebu", "haze"], RiskColor::Grey),
];

impl RiskColor {
    /// Classify a forecast summary by case-insensitive keyword match
    pub fn from_summary(summary: &str) -> Self {
        let summary = summary.to_lowercase();
        SUMMARY_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| summary.contains(k)))
            .map(|(_, color)| *color)
            .unwrap_or(RiskColor::Grey)
    }
}
