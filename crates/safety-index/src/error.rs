use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Fatal problems detected while assembling the KPI catalog or the risk profile registry.
///
/// These only surface at startup; a running engine never produces them.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("catalog must declare at least one KPI")]
    EmptyCatalog,
    #[error("KPI key '{key}' is malformed (expected lowercase letters, digits and '_')")]
    MalformedKey { key: String },
    #[error("KPI key '{key}' is declared more than once")]
    DuplicateKey { key: String },
    #[error("KPI '{key}' has weight {weight} outside 0..=1")]
    InvalidWeight { key: String, weight: f64 },
    #[error("KPI '{key}' has target {target} outside 0..=100")]
    InvalidTarget { key: String, target: f64 },
    #[error("alias '{alias}' points at unknown KPI '{key}'")]
    UnknownAliasTarget { alias: String, key: String },
    #[error("alias '{alias}' for '{key}' reuses a declared KPI key")]
    AliasShadowsKey { alias: String, key: String },
    #[error("risk profile id must not be empty")]
    EmptyProfileId,
    #[error("risk profile '{id}' is declared more than once")]
    DuplicateProfile { id: String },
    #[error("risk profile '{profile}' sets a floor on '{metric}', which is not a checked minimum")]
    UncheckedFloor { profile: String, metric: String },
    #[error("risk profile '{profile}' floor for '{metric}' is {floor}, expected 0..=100")]
    InvalidFloor {
        profile: String,
        metric: String,
        floor: f64,
    },
    #[error("risk profile '{profile}' overrides '{metric}' with weight {weight} outside 0..=1")]
    InvalidOverride {
        profile: String,
        metric: String,
        weight: f64,
    },
    #[error("risk profile '{profile}' has invalid penalty multiplier {multiplier}")]
    InvalidPenaltyMultiplier { profile: String, multiplier: f64 },
    #[error("domain '{domain}' maps to unknown risk profile '{profile}'")]
    UnknownDomainProfile { domain: String, profile: String },
    #[error("unable to parse configuration table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Catalog(ConfigurationError),
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Catalog(err) => write!(f, "scoring table error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Catalog(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
