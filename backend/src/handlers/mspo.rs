//! MSPO estate HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::external::ForecastClient;
use crate::services::MspoService;
use crate::AppState;

/// Get certified estates enriched with station forecasts and wind risk
pub async fn get_mspo_certified_entities(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    let service = MspoService::new(
        state.db.clone(),
        state.cache.clone(),
        ForecastClient::new(state.http.clone(), config.forecast.api_endpoint.clone()),
        config.forecast.stations_csv.clone().into(),
        config.raster.wind_speed_path.clone().into(),
        config.mspo.states.clone(),
    );

    match service.get_enriched_entities().await {
        Ok(data) => (StatusCode::OK, Json(serde_json::json!({ "data": data }))).into_response(),
        Err(e) => e.into_response(),
    }
}
