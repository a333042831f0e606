//! Share price HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::external::PriceClient;
use crate::services::{CompanyService, SharePriceService};
use crate::AppState;

/// Get recent daily closing prices
pub async fn get_share_price(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = SharePriceService::new(
        CompanyService::new(state.db.clone()),
        PriceClient::new(state.http.clone(), state.config.price.api_endpoint.clone()),
        state.config.price.exchange_suffix.clone(),
        state.config.price.lookback_days,
    );

    match service.get_share_prices(&code).await {
        Ok(series) => (StatusCode::OK, Json(series)).into_response(),
        Err(e) => e.into_response(),
    }
}
