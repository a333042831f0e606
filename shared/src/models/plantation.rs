//! MSPO-certified plantation models and their enriched risk records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::weather::{ForecastRecord, RiskColor};
use crate::types::GpsCoordinates;

/// An active MSPO-certified estate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantationEntity {
    pub company_name: String,
    pub parent_company: Option<String>,
    pub entity: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Certified area in hectares
    pub certified_area: f64,
    /// Planted area in hectares
    pub planted_area: f64,
    pub certified_area_pct: f64,
}

impl PlantationEntity {
    pub fn coordinates(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.latitude, self.longitude)
    }
}

/// Share of the planted area that is certified, in percent.
///
/// Returns `None` when the planted area is missing or zero, or when the
/// result is not a positive finite number.
pub fn certified_area_pct(certified_area: Option<f64>, planted_area: Option<f64>) -> Option<f64> {
    let planted = planted_area.filter(|p| p.is_finite() && *p != 0.0)?;
    let certified = certified_area.filter(|c| c.is_finite())?;
    let pct = certified / planted * 100.0;
    (pct.is_finite() && pct > 0.0).then_some(pct)
}

/// Why a wind-speed sample could not be produced for a point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SampleUnavailable {
    /// The raster could not be opened or decoded
    RasterUnavailable(String),
    /// The point falls outside the raster extent
    OutsideExtent,
    /// The pixel holds the raster's no-data value
    NoData,
    /// The point could not be projected into the raster CRS
    TransformFailed(String),
    /// The pixel value is NaN or infinite
    NonFinite,
}

impl std::fmt::Display for SampleUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleUnavailable::RasterUnavailable(msg) => write!(f, "raster unavailable: {}", msg),
            SampleUnavailable::OutsideExtent => write!(f, "point outside raster extent"),
            SampleUnavailable::NoData => write!(f, "no-data pixel"),
            SampleUnavailable::TransformFailed(msg) => write!(f, "transform failed: {}", msg),
            SampleUnavailable::NonFinite => write!(f, "non-finite pixel value"),
        }
    }
}

/// Result of sampling the wind-speed raster at one point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WindSample {
    Sampled(f64),
    Unavailable(SampleUnavailable),
}

impl WindSample {
    pub fn value(&self) -> Option<f64> {
        match self {
            WindSample::Sampled(v) => Some(*v),
            WindSample::Unavailable(_) => None,
        }
    }
}

/// Ordinal wind risk category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WindRisk {
    Unknown,
    Low,
    Moderate,
    Strong,
    Dangerous,
}

impl std::fmt::Display for WindRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindRisk::Unknown => write!(f, "unknown"),
            WindRisk::Low => write!(f, "low"),
            WindRisk::Moderate => write!(f, "moderate"),
            WindRisk::Strong => write!(f, "strong"),
            WindRisk::Dangerous => write!(f, "dangerous"),
        }
    }
}

/// One output row of the MSPO enrichment endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedPlantationRecord {
    #[serde(flatten)]
    pub plantation: PlantationEntity,
    pub nearest_station: Option<String>,
    pub distance_km: Option<f64>,
    pub date: Option<NaiveDate>,
    pub summary_forecast: Option<String>,
    pub color: Option<RiskColor>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub mean_wind_speed_10m: Option<f64>,
    pub wind_risk: WindRisk,
}

impl EnrichedPlantationRecord {
    /// Copy the forecast fields onto this record
    pub fn with_forecast(mut self, forecast: &ForecastRecord) -> Self {
        self.date = Some(forecast.date);
        self.summary_forecast = Some(forecast.summary_forecast.clone());
        self.color = Some(forecast.color);
        self.min_temp = forecast.min_temp;
        self.max_temp = forecast.max_temp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certified_area_pct() {
        assert_eq!(certified_area_pct(Some(50.0), Some(200.0)), Some(25.0));
        assert_eq!(certified_area_pct(Some(120.0), Some(100.0)), Some(120.0));
    }

    #[test]
    fn test_certified_area_pct_zero_planted_area() {
        assert_eq!(certified_area_pct(Some(50.0), Some(0.0)), None);
    }

    #[test]
    fn test_certified_area_pct_missing_values() {
        assert_eq!(certified_area_pct(Some(50.0), None), None);
        assert_eq!(certified_area_pct(None, Some(100.0)), None);
        assert_eq!(certified_area_pct(Some(50.0), Some(f64::NAN)), None);
    }

    #[test]
    fn test_certified_area_pct_never_negative() {
        assert_eq!(certified_area_pct(Some(50.0), Some(-10.0)), None);
        assert_eq!(certified_area_pct(Some(0.0), Some(10.0)), None);
    }

    #[test]
    fn test_unavailable_reason_serialization() {
        let json = serde_json::to_value(SampleUnavailable::NoData).unwrap();
        assert_eq!(json, serde_json::json!({ "reason": "no_data" }));
    }
}
