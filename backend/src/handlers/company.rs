//! Company data HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::services::CompanyService;
use crate::AppState;

/// Get a company's master record
pub async fn get_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_profile(&code).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get monthly production volumes
pub async fn get_production(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_production(&code).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get extraction rates
pub async fn get_extraction(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_extraction_rates(&code).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the plantation area breakdown
pub async fn get_plantation_area(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_plantation_area(&code).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get quarterly earnings
pub async fn get_earnings(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_earnings(&code).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the revenue/cost flow graph
pub async fn get_sankey(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_sankey(&code).await {
        Ok(graph) => (StatusCode::OK, Json(graph)).into_response(),
        Err(e) => e.into_response(),
    }
}
