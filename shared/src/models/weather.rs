//! Weather station and forecast models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// A weather station from the static station-coordinate table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherStation {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherStation {
    pub fn coordinates(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.latitude, self.longitude)
    }
}

/// Map colour derived from a forecast summary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Red,
    Orange,
    Yellow,
    Grey,
}

impl std::fmt::Display for RiskColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskColor::Green => write!(f, "green"),
            RiskColor::Red => write!(f, "red"),
            RiskColor::Orange => write!(f, "orange"),
            RiskColor::Yellow => write!(f, "yellow"),
            RiskColor::Grey => write!(f, "grey"),
        }
    }
}

/// Daily forecast for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRecord {
    pub location_name: String,
    pub date: NaiveDate,
    pub summary_forecast: String,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub color: RiskColor,
}

/// Forecast row left-joined with the station table on `location_name`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationForecast {
    #[serde(flatten)]
    pub forecast: ForecastRecord,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Stations plus their joined forecasts, loaded once per process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationForecastTable {
    pub stations: Vec<WeatherStation>,
    pub forecasts: Vec<StationForecast>,
}

impl StationForecastTable {
    /// Left-join forecasts against stations. Forecast order is preserved and
    /// forecasts for unknown locations keep empty coordinates.
    pub fn join(stations: Vec<WeatherStation>, forecasts: Vec<ForecastRecord>) -> Self {
        let forecasts = forecasts
            .into_iter()
            .map(|forecast| {
                let station = stations
                    .iter()
                    .find(|s| s.location_name == forecast.location_name);
                StationForecast {
                    latitude: station.map(|s| s.latitude),
                    longitude: station.map(|s| s.longitude),
                    forecast,
                }
            })
            .collect();

        Self {
            stations,
            forecasts,
        }
    }

    /// All forecasts for a station, in feed order
    pub fn forecasts_for<'a>(
        &'a self,
        location_name: &'a str,
    ) -> impl Iterator<Item = &'a ForecastRecord> + 'a {
        self.forecasts
            .iter()
            .map(|f| &f.forecast)
            .filter(move |f| f.location_name == location_name)
    }
}
