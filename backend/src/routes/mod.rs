//! Route definitions for the Palm Oil Intelligence API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Company data, keyed by short code
        .route("/company/:code", get(handlers::get_company))
        .route("/company/sankey/:code", get(handlers::get_sankey))
        .route("/production/:code", get(handlers::get_production))
        .route("/extraction/:code", get(handlers::get_extraction))
        .route("/plantation-area/:code", get(handlers::get_plantation_area))
        .route("/earnings/:code", get(handlers::get_earnings))
        // Upstream feeds
        .route("/shareprice/:code", get(handlers::get_share_price))
        .route("/news", get(handlers::get_news))
        // Geospatial enrichment
        .route(
            "/mspo-certified-entities",
            get(handlers::get_mspo_certified_entities),
        )
}
