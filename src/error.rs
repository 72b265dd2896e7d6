//! Error types and handling for the forecast summary service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the forecast summary service
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Path coordinates that are not finite numbers
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// The weather provider refused the point lookup
    #[error("Forecast point lookup failed with status {status}")]
    PointsLookup { status: u16 },

    /// The weather provider refused the gridpoint forecast
    #[error("Detailed forecast request failed with status {status}")]
    DetailedForecast { status: u16 },

    /// Transport or decode failure talking to an upstream service
    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// No credential available for the text-generation backend
    #[error("Missing credential: environment variable {variable} is not set")]
    MissingCredential { variable: &'static str },

    /// The text-generation backend answered with an error or nothing usable
    #[error("Summarization failed: {message}")]
    Summarization { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ForecastError {
    /// Create a new coordinate validation error
    pub fn invalid_coordinates<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }

    /// Create a new upstream transport error
    pub fn upstream<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// Create a new summarization error
    pub fn summarization<S: Into<String>>(message: S) -> Self {
        Self::Summarization {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status reported to the caller
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForecastError::InvalidCoordinates { .. } => StatusCode::BAD_REQUEST,
            ForecastError::PointsLookup { status } | ForecastError::DetailedForecast { status } => {
                passthrough_status(*status)
            }
            ForecastError::Upstream { .. } | ForecastError::Summarization { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ForecastError::MissingCredential { .. } | ForecastError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::InvalidCoordinates { .. } => self.to_string(),
            ForecastError::PointsLookup { .. } => "Failed to retrieve forecast data.".to_string(),
            ForecastError::DetailedForecast { .. } => {
                "Failed to retrieve detailed forecast data.".to_string()
            }
            ForecastError::Upstream { service, .. } => {
                format!("Unable to reach the {service} service.")
            }
            ForecastError::MissingCredential { .. } => {
                "Summarization service is not configured.".to_string()
            }
            ForecastError::Summarization { .. } => "Failed to summarize forecast data.".to_string(),
            ForecastError::Config { .. } => "Internal server error.".to_string(),
        }
    }
}

/// Upstream statuses are forwarded when they are errors; anything else is a bad gateway.
fn passthrough_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}
