//! News HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::external::NewsClient;
use crate::services::NewsService;
use crate::AppState;

/// Get the latest palm-oil headlines
pub async fn get_news(State(state): State<AppState>) -> impl IntoResponse {
    let service = NewsService::new(
        NewsClient::new(state.http.clone(), state.config.news.base_url.clone()),
        state.config.news.utc_offset_hours,
    );

    match service.get_news().await {
        Ok(feed) => (StatusCode::OK, Json(feed)).into_response(),
        Err(e) => e.into_response(),
    }
}
