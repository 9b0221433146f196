use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub desk: DeskSettings,
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

        let signature_width = read_u32("APP_SIGNATURE_WIDTH", 480)?;
        let signature_height = read_u32("APP_SIGNATURE_HEIGHT", 160)?;
        if signature_width == 0 || signature_height == 0 {
            return Err(ConfigError::InvalidSignatureSurface);
        }

        let max_upload_bytes = env::var("APP_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (5 * 1024 * 1024).to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidUploadCap)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            desk: DeskSettings {
                signature_width,
                signature_height,
                max_upload_bytes,
            },
        })
    }
}

fn read_u32(key: &str, default: u32) -> Result<u32, ConfigError> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidSignatureSurface)
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

/// Contract-desk tunables surfaced through the environment: the signature
/// surface handed to the approval screen and the per-file upload cap.
#[derive(Debug, Clone)]
pub struct DeskSettings {
    pub signature_width: u32,
    pub signature_height: u32,
    pub max_upload_bytes: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSignatureSurface,
    InvalidUploadCap,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSignatureSurface => write!(
                f,
                "APP_SIGNATURE_WIDTH and APP_SIGNATURE_HEIGHT must be positive integers"
            ),
            ConfigError::InvalidUploadCap => {
                write!(f, "APP_MAX_UPLOAD_BYTES must be a valid byte count")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
