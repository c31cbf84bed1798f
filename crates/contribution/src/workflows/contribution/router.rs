use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::repository::{ContributionRepository, RepositoryError};
use super::service::{ContributionService, ContributionServiceError, UploadSummary};
use crate::workflows::ingest::UploadedSheet;

/// Router builder exposing upload, calculation, and result endpoints.
pub fn contribution_router<R>(service: Arc<ContributionService<R>>) -> Router
where
    R: ContributionRepository + 'static,
{
    Router::new()
        .route("/api/v1/salaries/upload", post(upload_salaries_handler::<R>))
        .route(
            "/api/v1/cities/upload",
            post(upload_city_standards_handler::<R>),
        )
        .route("/api/v1/calculate", post(calculate_handler::<R>))
        .route("/api/v1/results", get(results_handler::<R>))
        .with_state(service)
}

pub(crate) async fn upload_salaries_handler<R>(
    State(service): State<Arc<ContributionService<R>>>,
    Json(sheet): Json<UploadedSheet>,
) -> Response
where
    R: ContributionRepository + 'static,
{
    match service.upload_salaries(&sheet) {
        Ok(summary) => upload_response(summary),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_city_standards_handler<R>(
    State(service): State<Arc<ContributionService<R>>>,
    Json(sheet): Json<UploadedSheet>,
) -> Response
where
    R: ContributionRepository + 'static,
{
    match service.upload_city_standards(&sheet) {
        Ok(summary) => upload_response(summary),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calculate_handler<R>(
    State(service): State<Arc<ContributionService<R>>>,
) -> Response
where
    R: ContributionRepository + 'static,
{
    match service.calculate() {
        Ok(summary) => {
            let payload = json!({
                "success": true,
                "message": summary.message(),
                "count": summary.count,
                "city_name": summary.city_name,
                "calculated_at": summary.calculated_at,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<ContributionService<R>>>,
) -> Response
where
    R: ContributionRepository + 'static,
{
    match service.results() {
        Ok(results) => {
            let payload = json!({
                "count": results.len(),
                "results": results,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn upload_response(summary: UploadSummary) -> Response {
    let payload = json!({
        "success": true,
        "message": summary.message(),
        "count": summary.count,
        "table": summary.table,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) fn error_status(error: &ContributionServiceError) -> StatusCode {
    match error {
        ContributionServiceError::Ingest(_) => StatusCode::BAD_REQUEST,
        ContributionServiceError::Calculation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ContributionServiceError::Repository(RepositoryError::Ambiguous { .. }) => {
            StatusCode::CONFLICT
        }
        ContributionServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: ContributionServiceError) -> Response {
    let payload = json!({
        "success": false,
        "error": error.to_string(),
    });
    (error_status(&error), Json(payload)).into_response()
}
