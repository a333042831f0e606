//! Configuration management for the Palm Oil Intelligence API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PALM_ prefix

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Outbound HTTP client configuration
    pub http: HttpConfig,

    /// Weather forecast feed and station table
    pub forecast: ForecastConfig,

    /// Share price feed
    pub price: PriceConfig,

    /// News source
    pub news: NewsConfig,

    /// Static rasters
    pub raster: RasterConfig,

    /// MSPO entity selection
    pub mspo: MspoConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Timeout applied to every upstream request
    pub timeout_secs: u64,

    /// User agent sent upstream
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForecastConfig {
    /// Forecast feed endpoint
    pub api_endpoint: String,

    /// CSV with location_name, latitude, longitude
    pub stations_csv: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PriceConfig {
    /// Chart API endpoint, ticker is appended as a path segment
    pub api_endpoint: String,

    /// Exchange suffix appended to stock codes
    pub exchange_suffix: String,

    /// How many days of closes to return
    pub lookback_days: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NewsConfig {
    /// News site root, also used to absolutize relative links
    pub base_url: String,

    /// Hours the news site's local date runs ahead of UTC
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RasterConfig {
    /// GeoTIFF of modelled mean wind speed at 10 m
    pub wind_speed_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MspoConfig {
    /// States whose estates are returned
    pub states: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("PALM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .add_source(config::Config::try_from(&Config::default())?)
            .set_override("environment", environment.clone())?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PALM_ prefix)
            .add_source(
                Environment::with_prefix("PALM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("mspo.states")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "sqlite://data/bursa_palmai_database.db".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            http: HttpConfig {
                timeout_secs: 15,
                user_agent: "Mozilla/5.0 (compatible; palm-oil-intelligence/0.1)".to_string(),
            },
            forecast: ForecastConfig {
                api_endpoint: "https://api.data.gov.my/weather/forecast".to_string(),
                stations_csv: "data/weather_stations.csv".to_string(),
            },
            price: PriceConfig {
                api_endpoint: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
                exchange_suffix: ".KL".to_string(),
                lookback_days: 30,
            },
            news: NewsConfig {
                base_url: "https://theedgemalaysia.com".to_string(),
                utc_offset_hours: 8,
            },
            raster: RasterConfig {
                wind_speed_path: "data/MYS_wind-speed_10m.tif".to_string(),
            },
            mspo: MspoConfig {
                states: vec!["Johor".to_string(), "Pahang".to_string()],
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_config_builder() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default()).unwrap())
            .build()
            .unwrap();
        let config: Config = built.try_deserialize().unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.price.exchange_suffix, ".KL");
        assert_eq!(config.mspo.states, vec!["Johor", "Pahang"]);
    }
}
