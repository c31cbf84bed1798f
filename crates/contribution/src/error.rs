use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::contribution::{CalculationError, ContributionServiceError, RepositoryError};
use crate::workflows::ingest::IngestError;
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
    Ingest(IngestError),
    Calculation(CalculationError),
    Repository(RepositoryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Ingest(err) => write!(f, "upload rejected: {}", err),
            AppError::Calculation(err) => write!(f, "calculation failed: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
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
            AppError::Ingest(err) => Some(err),
            AppError::Calculation(err) => Some(err),
            AppError::Repository(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Ingest(_) => StatusCode::BAD_REQUEST,
            AppError::Calculation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Repository(RepositoryError::Ambiguous { .. }) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

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

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

impl From<CalculationError> for AppError {
    fn from(value: CalculationError) -> Self {
        Self::Calculation(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ContributionServiceError> for AppError {
    fn from(value: ContributionServiceError) -> Self {
        match value {
            ContributionServiceError::Ingest(err) => Self::Ingest(err),
            ContributionServiceError::Calculation(err) => Self::Calculation(err),
            ContributionServiceError::Repository(err) => Self::Repository(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contribution::MissingInput;

    #[test]
    fn service_errors_keep_their_status() {
        let missing: AppError =
            ContributionServiceError::from(CalculationError::MissingInput(MissingInput::Salaries))
                .into();
        assert_eq!(
            missing.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let ingest: AppError = IngestError::Empty.into();
        assert_eq!(ingest.into_response().status(), StatusCode::BAD_REQUEST);

        let storage: AppError = RepositoryError::Unavailable("disk full".to_string()).into();
        assert_eq!(
            storage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
