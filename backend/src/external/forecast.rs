//! Weather forecast feed client
//!
//! Integrates with the Malaysian open-data weather forecast API, which returns
//! one row per location per day with the location nested as an object.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use shared::{ForecastRecord, RiskColor};

use crate::error::{AppError, AppResult};

/// Forecast feed client
#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    endpoint: String,
}

/// Raw forecast row from the feed
#[derive(Debug, Deserialize)]
struct FeedForecast {
    location: FeedLocation,
    date: String,
    summary_forecast: Option<String>,
    min_temp: Option<f64>,
    max_temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FeedLocation {
    location_name: String,
}

impl ForecastClient {
    /// Create a new ForecastClient sharing an existing HTTP client
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Fetch every location's daily forecast
    pub async fn fetch_forecasts(&self) -> AppResult<Vec<ForecastRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AppError::ForecastUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ForecastUnavailable(format!(
                "forecast API error: {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ForecastUnavailable(format!("failed to read body: {}", e)))?;

        parse_forecasts(&body)
    }
}

/// Parse and normalize a forecast feed body
pub fn parse_forecasts(body: &str) -> AppResult<Vec<ForecastRecord>> {
    let rows: Vec<FeedForecast> = serde_json::from_str(body)
        .map_err(|e| AppError::ForecastUnavailable(format!("failed to parse forecast: {}", e)))?;

    rows.into_iter().map(convert_forecast).collect()
}

/// Flatten the nested location, parse the date and classify the summary
fn convert_forecast(row: FeedForecast) -> AppResult<ForecastRecord> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
        AppError::ForecastUnavailable(format!("invalid forecast date '{}': {}", row.date, e))
    })?;
    let summary_forecast = row.summary_forecast.unwrap_or_default();

    Ok(ForecastRecord {
        location_name: row.location.location_name,
        date,
        color: RiskColor::from_summary(&summary_forecast),
        summary_forecast,
        min_temp: row.min_temp,
        max_temp: row.max_temp,
    })
}
