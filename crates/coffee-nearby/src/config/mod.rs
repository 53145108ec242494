use crate::stores::domain::{Coordinates, CoordinatesError, DEFAULT_QUERY, MAX_LIMIT};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PLACES_URL: &str = "https://api.foursquare.com/v3/places/search";
pub const DEFAULT_LIMIT: u32 = 6;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub places: PlacesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            places: PlacesConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Upstream places-search settings and the defaults applied to store queries.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_coordinates: Coordinates,
    pub default_limit: u32,
    pub query: String,
    /// Unset means requests are never timed out.
    pub timeout: Option<Duration>,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PLACES_URL.to_string(),
            default_coordinates: Coordinates::toronto(),
            default_limit: DEFAULT_LIMIT,
            query: DEFAULT_QUERY.to_string(),
            timeout: None,
        }
    }
}

impl PlacesConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("FOURSQUARE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url =
            env::var("PLACES_BASE_URL").unwrap_or_else(|_| DEFAULT_PLACES_URL.to_string());

        let default_coordinates = match env::var("PLACES_DEFAULT_LAT_LONG") {
            Ok(raw) => raw
                .parse::<Coordinates>()
                .map_err(|source| ConfigError::InvalidCoordinates { source })?,
            Err(_) => Coordinates::toronto(),
        };

        let default_limit = match env::var("PLACES_DEFAULT_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|limit| (1..=MAX_LIMIT).contains(limit))
                .ok_or(ConfigError::InvalidLimit)?,
            Err(_) => DEFAULT_LIMIT,
        };

        let query = env::var("PLACES_QUERY")
            .ok()
            .filter(|query| !query.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());

        let timeout = match env::var("PLACES_TIMEOUT_SECS") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidTimeout)?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            api_key,
            base_url,
            default_coordinates,
            default_limit,
            query,
            timeout,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCoordinates { source: CoordinatesError },
    InvalidLimit,
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCoordinates { source } => {
                write!(f, "PLACES_DEFAULT_LAT_LONG is invalid: {source}")
            }
            ConfigError::InvalidLimit => {
                write!(f, "PLACES_DEFAULT_LIMIT must be between 1 and {MAX_LIMIT}")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PLACES_TIMEOUT_SECS must be a whole number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidCoordinates { source } => Some(source),
            ConfigError::InvalidPort | ConfigError::InvalidLimit | ConfigError::InvalidTimeout => {
                None
            }
        }
    }
}
