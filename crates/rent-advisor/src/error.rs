use crate::analyses::{AnalysisServiceError, RepositoryError};
use crate::comparables::ComparableSourceError;
use crate::config::ConfigError;
use crate::narrative::NarrativeError;
use crate::pricing::PricingError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Pricing(PricingError),
    Comparables(ComparableSourceError),
    Analysis(AnalysisServiceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Pricing(err) => pricing_status(err),
            AppError::Comparables(err) => comparables_status(err),
            AppError::Analysis(AnalysisServiceError::Pricing(err)) => pricing_status(err),
            AppError::Analysis(AnalysisServiceError::Comparables(err)) => comparables_status(err),
            AppError::Analysis(AnalysisServiceError::MissingField(_)) => StatusCode::BAD_REQUEST,
            AppError::Analysis(AnalysisServiceError::Narrative(NarrativeError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Analysis(AnalysisServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Analysis(AnalysisServiceError::Repository(RepositoryError::Conflict)) => {
                StatusCode::CONFLICT
            }
            AppError::Analysis(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn pricing_status(err: &PricingError) -> StatusCode {
    match err {
        PricingError::NoComparableData | PricingError::NonPositiveEstimate { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PricingError::InvalidNumericInput { .. } => StatusCode::BAD_REQUEST,
    }
}

fn comparables_status(err: &ComparableSourceError) -> StatusCode {
    match err {
        ComparableSourceError::InsufficientSubject(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Pricing(err) => write!(f, "pricing error: {}", err),
            AppError::Comparables(err) => write!(f, "comparables error: {}", err),
            AppError::Analysis(err) => write!(f, "analysis error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Pricing(err) => Some(err),
            AppError::Comparables(err) => Some(err),
            AppError::Analysis(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
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

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PricingError> for AppError {
    fn from(value: PricingError) -> Self {
        Self::Pricing(value)
    }
}

impl From<ComparableSourceError> for AppError {
    fn from(value: ComparableSourceError) -> Self {
        Self::Comparables(value)
    }
}

impl From<AnalysisServiceError> for AppError {
    fn from(value: AnalysisServiceError) -> Self {
        Self::Analysis(value)
    }
}
