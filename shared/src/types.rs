//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Response envelope for lookups that may legitimately find nothing.
///
/// A missing result is not an HTTP failure: it serializes as
/// `{"error": "<message>"}` next to a normal status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Lookup<T> {
    Found(T),
    Missing { error: String },
}

impl<T> Lookup<T> {
    pub fn missing(message: impl Into<String>) -> Self {
        Lookup::Missing {
            error: message.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Parse a loosely typed numeric cell. Anything that is not a finite number
/// (empty, "N/A", "-", NaN) is treated as missing.
pub fn parse_numeric(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().replace(',', "").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
