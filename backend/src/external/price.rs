//! Share price feed client
//!
//! Reads daily closes from the Yahoo Finance chart API. An unknown ticker or
//! a range without trading days yields an empty series rather than an error.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Price feed client
#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_url: String,
}

/// A single trading day's close
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl PriceClient {
    /// Create a new PriceClient sharing an existing HTTP client
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Fetch daily closes for `ticker` between two instants
    pub async fn daily_closes(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<DailyClose>> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url.trim_end_matches('/'),
            ticker,
            start.timestamp(),
            end.timestamp()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Price API request failed: {}", e)))?;

        // Unknown symbols come back as 404 with an empty chart
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(ticker, "price feed has no chart for ticker");
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Price API error: {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read price response: {}", e)))?;

        parse_chart(&body)
    }
}

/// Parse a chart body into dated closes, skipping days without a close
pub fn parse_chart(body: &str) -> AppResult<Vec<DailyClose>> {
    let data: ChartResponse = serde_json::from_str(body)
        .map_err(|e| AppError::ExternalService(format!("Failed to parse price response: {}", e)))?;

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    Ok(result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(DailyClose { date, close })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "5285.KL", "gmtoffset": 28800},
            "timestamp": [1748995200, 1749081600, 1749168000],
            "indicators": {"quote": [{"close": [4.5399999618530273, null, 4.61]}]}
        }], "error": null}}"#;

        let closes = parse_chart(body).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert!((closes[0].close - 4.54).abs() < 1e-6);
        assert_eq!(closes[1].date, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    }

    #[test]
    fn test_parse_chart_without_result_is_empty() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found",
                       "description": "No data found, symbol may be delisted"}}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let body = r#"{"chart": {"result": [{"meta": {}, "indicators": {"quote": [{}]}}]}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }
}
