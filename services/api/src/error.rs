use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use safety_index::error::{AppError, ConfigurationError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Csv(csv::Error),
    Json(serde_json::Error),
    Join(tokio::task::JoinError),
    InvalidRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::App(err) => write!(f, "{}", err),
            ApiError::Csv(err) => write!(f, "invalid batch CSV: {}", err),
            ApiError::Json(err) => write!(f, "unable to encode output: {}", err),
            ApiError::Join(err) => write!(f, "evaluation task failed: {}", err),
            ApiError::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::App(err) => Some(err),
            ApiError::Csv(err) => Some(err),
            ApiError::Json(err) => Some(err),
            ApiError::Join(err) => Some(err),
            ApiError::InvalidRequest(_) => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidRequest(_) | ApiError::Csv(_) => StatusCode::BAD_REQUEST,
            ApiError::App(_) | ApiError::Json(_) | ApiError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(value: ConfigurationError) -> Self {
        Self::App(AppError::from(value))
    }
}

impl From<safety_index::config::ConfigError> for ApiError {
    fn from(value: safety_index::config::ConfigError) -> Self {
        Self::App(AppError::from(value))
    }
}

impl From<safety_index::telemetry::TelemetryError> for ApiError {
    fn from(value: safety_index::telemetry::TelemetryError) -> Self {
        Self::App(AppError::from(value))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(value: std::io::Error) -> Self {
        Self::App(AppError::from(value))
    }
}

impl From<csv::Error> for ApiError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Join(value)
    }
}
