//! MSPO estate enrichment
//!
//! Joins active certified estates with their nearest weather station, that
//! station's daily forecasts and the modelled wind speed at the estate.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use shared::{
    certified_area_pct, nearest_station, parse_numeric, round2, EnrichedPlantationRecord,
    GpsCoordinates, PlantationEntity, StationForecastTable, WindRisk, WindSample,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::cache::DataCache;
use super::stations::load_station_forecasts;
use super::wind::sample_layer;
use crate::error::{AppError, AppResult};
use crate::external::ForecastClient;

/// MSPO enrichment service
#[derive(Clone)]
pub struct MspoService {
    db: SqlitePool,
    cache: Arc<DataCache>,
    forecasts: ForecastClient,
    stations_csv: PathBuf,
    wind_raster: PathBuf,
    states: Vec<String>,
}

/// Raw entity row. Numeric columns are read as text because the source sheet
/// mixes numbers with blanks and placeholders.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EntityRow {
    company_name: Option<String>,
    parent_company: Option<String>,
    entity: Option<String>,
    category: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    certified_area: Option<String>,
    planted_area: Option<String>,
}

impl EntityRow {
    /// Validated entity, or `None` when coordinates or areas are unusable
    fn into_entity(self) -> Option<PlantationEntity> {
        let latitude = parse_numeric(self.latitude.as_deref())?;
        let longitude = parse_numeric(self.longitude.as_deref())?;
        if !GpsCoordinates::new(latitude, longitude).is_valid() {
            return None;
        }

        let certified_area = parse_numeric(self.certified_area.as_deref())?;
        let planted_area = parse_numeric(self.planted_area.as_deref());
        let pct = certified_area_pct(Some(certified_area), planted_area)?;

        Some(PlantationEntity {
            company_name: self.company_name.unwrap_or_default(),
            parent_company: self.parent_company.filter(|p| !p.trim().is_empty()),
            entity: self.entity.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            latitude,
            longitude,
            certified_area,
            planted_area: planted_area?,
            certified_area_pct: pct,
        })
    }
}

impl MspoService {
    pub fn new(
        db: SqlitePool,
        cache: Arc<DataCache>,
        forecasts: ForecastClient,
        stations_csv: PathBuf,
        wind_raster: PathBuf,
        states: Vec<String>,
    ) -> Self {
        Self {
            db,
            cache,
            forecasts,
            stations_csv,
            wind_raster,
            states,
        }
    }

    /// Active certified estates in the configured states, in table order
    pub async fn get_entities(&self) -> AppResult<Vec<PlantationEntity>> {
        if self.states.is_empty() {
            return Err(AppError::Configuration(
                "no MSPO states configured".to_string(),
            ));
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT company_name, parent_company, entity, category,
                   CAST(latitude AS TEXT) AS latitude,
                   CAST(longitude AS TEXT) AS longitude,
                   CAST(certified_area AS TEXT) AS certified_area,
                   CAST(planted_area AS TEXT) AS planted_area
            FROM mspo_certified_entities
            WHERE category = 'Estate' AND status = 'Active' AND state IN ("#,
        );
        let mut states = query.separated(", ");
        for state in &self.states {
            states.push_bind(state);
        }
        states.push_unseparated(")");

        let rows: Vec<EntityRow> = query.build_query_as().fetch_all(&self.db).await?;
        let total = rows.len();

        let entities: Vec<PlantationEntity> =
            rows.into_iter().filter_map(EntityRow::into_entity).collect();

        tracing::debug!(
            total,
            kept = entities.len(),
            "MSPO entities loaded"
        );

        Ok(entities)
    }

    /// Enriched rows for every estate
    pub async fn get_enriched_entities(&self) -> AppResult<Vec<EnrichedPlantationRecord>> {
        let entities = self.get_entities().await?;

        let table = self
            .cache
            .station_forecasts(|| load_station_forecasts(&self.forecasts, &self.stations_csv))
            .await?;
        let layer = self.cache.wind_raster(self.wind_raster.clone()).await;

        Ok(assemble(&entities, table, |point| sample_layer(layer, point)))
    }
}

/// Build output rows for `entities` in order, one per forecast of the nearest
/// station (or one without forecast fields), then drop repeated rows keeping
/// the first occurrence.
pub fn assemble<S>(
    entities: &[PlantationEntity],
    table: &StationForecastTable,
    mut sample: S,
) -> Vec<EnrichedPlantationRecord>
where
    S: FnMut(GpsCoordinates) -> WindSample,
{
    let mut rows = Vec::new();

    for entity in entities {
        let point = entity.coordinates();
        let nearest = nearest_station(point, &table.stations);

        let wind = sample(point);
        if let WindSample::Unavailable(reason) = &wind {
            tracing::debug!(entity = %entity.entity, %reason, "wind speed unavailable");
        }

        let base = EnrichedPlantationRecord {
            plantation: entity.clone(),
            nearest_station: nearest.as_ref().map(|m| m.station.location_name.clone()),
            distance_km: nearest.as_ref().map(|m| m.distance_km),
            date: None,
            summary_forecast: None,
            color: None,
            min_temp: None,
            max_temp: None,
            mean_wind_speed_10m: wind.value().map(round2),
            wind_risk: WindRisk::from_sample(&wind),
        };

        let forecasts: Vec<_> = match &nearest {
            Some(m) => table.forecasts_for(&m.station.location_name).collect(),
            None => Vec::new(),
        };

        if forecasts.is_empty() {
            rows.push(base);
        } else {
            rows.extend(forecasts.into_iter().map(|f| base.clone().with_forecast(f)));
        }
    }

    dedupe(rows)
}

/// Remove repeated rows, keeping the first occurrence of each
fn dedupe(rows: Vec<EnrichedPlantationRecord>) -> Vec<EnrichedPlantationRecord> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| match serde_json::to_string(row) {
            Ok(key) => seen.insert(key),
            Err(_) => true,
        })
        .collect()
}
