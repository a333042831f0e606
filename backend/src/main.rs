//! Palm Oil Intelligence API - Backend Server

use std::{net::SocketAddr, str::FromStr, time::Duration};

use palm_backend::{build_http_client, create_app, AppState, Config};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "palm_server=debug,palm_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Palm Oil Intelligence Server");
    tracing::info!("Environment: {}", config.environment);

    // The database is a prebuilt file; never create it
    tracing::info!("Opening database {}", config.database.url);
    let connect_options = SqliteConnectOptions::from_str(&config.database.url)?
        .read_only(true)
        .create_if_missing(false);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(connect_options)
        .await?;

    tracing::info!("Database connection established");

    let http = build_http_client(&config)?;

    // Create application state
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(db_pool, config, http);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
