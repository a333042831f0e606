//! Weather station table and the joined station/forecast loader

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use shared::{parse_numeric, StationForecastTable, WeatherStation};

use crate::error::{AppError, AppResult};
use crate::external::ForecastClient;

/// Raw CSV row; coordinates are validated after reading
#[derive(Debug, Deserialize)]
struct StationRow {
    location_name: String,
    latitude: Option<String>,
    longitude: Option<String>,
}

/// Parse a `location_name,latitude,longitude` CSV. Rows without usable
/// coordinates are skipped; file order is kept.
pub fn parse_station_csv<R: Read>(reader: R) -> AppResult<Vec<WeatherStation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stations = Vec::new();
    for (line, result) in rdr.deserialize::<StationRow>().enumerate() {
        let row = result.map_err(|e| AppError::StationTable(e.to_string()))?;

        let coordinates = (
            parse_numeric(row.latitude.as_deref()),
            parse_numeric(row.longitude.as_deref()),
        );
        let (Some(latitude), Some(longitude)) = coordinates else {
            tracing::warn!(
                row = line + 1,
                station = %row.location_name,
                "station skipped: missing coordinates"
            );
            continue;
        };

        stations.push(WeatherStation {
            location_name: row.location_name,
            latitude,
            longitude,
        });
    }

    Ok(stations)
}

/// Read the station table from disk
pub async fn load_stations(path: &Path) -> AppResult<Vec<WeatherStation>> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::StationTable(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_station_csv(raw.as_slice())
}

/// Fetch the forecast feed and left-join it with the station table
pub async fn load_station_forecasts(
    forecasts: &ForecastClient,
    stations_csv: &Path,
) -> AppResult<StationForecastTable> {
    let (stations, records) =
        tokio::try_join!(load_stations(stations_csv), forecasts.fetch_forecasts())?;

    let table = StationForecastTable::join(stations, records);
    let unmatched = table
        .forecasts
        .iter()
        .filter(|f| f.latitude.is_none())
        .count();

    tracing::info!(
        stations = table.stations.len(),
        forecasts = table.forecasts.len(),
        unmatched,
        "station forecasts loaded"
    );

    Ok(table)
}
