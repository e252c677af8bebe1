use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HISTOGRAM_BUCKET: u8 = 10;
const DEFAULT_GENDER_BUCKET: u8 = 5;
const DEFAULT_PUBLIC_THRESHOLD: u64 = 2025;

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
    pub statistics: StatisticsConfig,
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

        let statistics = StatisticsConfig {
            histogram_bucket_width: bucket_width("STATS_HISTOGRAM_BUCKET", DEFAULT_HISTOGRAM_BUCKET)?,
            gender_bucket_width: bucket_width("STATS_GENDER_BUCKET", DEFAULT_GENDER_BUCKET)?,
            show_not_provided: match env::var("STATS_SHOW_NOT_PROVIDED") {
                Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                    name: "STATS_SHOW_NOT_PROVIDED",
                })?,
                Err(_) => true,
            },
            public_threshold: match env::var("STATS_PUBLIC_THRESHOLD") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidThreshold)?,
                Err(_) => DEFAULT_PUBLIC_THRESHOLD,
            },
            reveal_before_threshold: environment == AppEnvironment::Development,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            statistics,
        })
    }
}

fn bucket_width(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<u8>() {
        Ok(width) if (1..=100).contains(&width) => Ok(width),
        _ => Err(ConfigError::InvalidBucketWidth { name }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Dials for the statistics views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsConfig {
    /// Width of the overall score histogram buckets (0-100, last bucket absorbs 100).
    pub histogram_bucket_width: u8,
    /// Width of the per-gender score distribution buckets.
    pub gender_bucket_width: u8,
    /// Default for the "show legacy rows" toggle when a request does not set it.
    pub show_not_provided: bool,
    /// Submission count at which public statistics unlock.
    pub public_threshold: u64,
    pub reveal_before_threshold: bool,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            histogram_bucket_width: DEFAULT_HISTOGRAM_BUCKET,
            gender_bucket_width: DEFAULT_GENDER_BUCKET,
            show_not_provided: true,
            public_threshold: DEFAULT_PUBLIC_THRESHOLD,
            reveal_before_threshold: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBucketWidth { name: &'static str },
    InvalidFlag { name: &'static str },
    InvalidThreshold,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBucketWidth { name } => {
                write!(f, "{name} must be an integer between 1 and 100")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
            ConfigError::InvalidThreshold => {
                write!(f, "STATS_PUBLIC_THRESHOLD must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBucketWidth { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidThreshold => None,
        }
    }
}
