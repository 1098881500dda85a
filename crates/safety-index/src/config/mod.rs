use crate::scoring::{DisciplineScoringStrategy, EngineSettings, DEFAULT_EMPLOYEE_COUNT};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the binaries embedding the engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
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

        let default_employee_count = match env::var("SAFETY_INDEX_DEFAULT_EMPLOYEES") {
            Ok(raw) => parse_employee_count(&raw)?,
            Err(_) => DEFAULT_EMPLOYEE_COUNT,
        };

        let discipline_strategy = match env::var("SAFETY_INDEX_DISCIPLINE_STRATEGY") {
            Ok(raw) => DisciplineScoringStrategy::parse(&raw)
                .ok_or(ConfigError::UnknownDisciplineStrategy { value: raw })?,
            Err(_) => DisciplineScoringStrategy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
                include_targets: environment != AppEnvironment::Production,
            },
            scoring: ScoringConfig {
                default_employee_count,
                discipline_strategy,
                catalog_path: env::var_os("SAFETY_INDEX_CATALOG_PATH").map(PathBuf::from),
                profiles_path: env::var_os("SAFETY_INDEX_PROFILES_PATH").map(PathBuf::from),
            },
        })
    }
}

fn parse_employee_count(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::InvalidEmployeeCount {
            value: raw.to_string(),
        }),
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
    pub ansi: bool,
    pub include_targets: bool,
}

/// Engine dials plus the optional locations of caller-maintained scoring tables.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub default_employee_count: u32,
    pub discipline_strategy: DisciplineScoringStrategy,
    pub catalog_path: Option<PathBuf>,
    pub profiles_path: Option<PathBuf>,
}

impl ScoringConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            default_employee_count: self.default_employee_count,
            discipline_strategy: self.discipline_strategy,
            ..EngineSettings::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEmployeeCount { value: String },
    UnknownDisciplineStrategy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEmployeeCount { value } => write!(
                f,
                "SAFETY_INDEX_DEFAULT_EMPLOYEES must be a positive integer, got '{value}'"
            ),
            ConfigError::UnknownDisciplineStrategy { value } => write!(
                f,
                "SAFETY_INDEX_DISCIPLINE_STRATEGY must be 'neutral_midpoint' or 'penalty_staircase', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidEmployeeCount { .. }
            | ConfigError::UnknownDisciplineStrategy { .. } => None,
        }
    }
}
