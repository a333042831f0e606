//! Palm Oil Intelligence API
//!
//! Read-only access to palm-oil company data, market prices, news and
//! weather-risk enriched MSPO estates.

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::DataCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub cache: Arc<DataCache>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config, http: reqwest::Client) -> Self {
        Self {
            db,
            config: Arc::new(config),
            http,
            cache: Arc::new(DataCache::new()),
        }
    }
}

/// Shared outbound HTTP client
pub fn build_http_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.http.timeout_secs))
        .user_agent(config.http.user_agent.clone())
        .build()
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Palm Oil Intelligence API v0.1"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}
