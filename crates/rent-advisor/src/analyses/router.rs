use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::narrative::{ComplianceRequest, ListingRequest};
use crate::neighborhood::{compute_neighborhood_score, NeighborhoodMetrics};
use crate::pricing::format_rent_range;

use super::domain::{AnalysisId, AnalysisRequest, RangeRequest};
use super::repository::AnalysisRepository;
use super::service::RentAnalysisService;

/// Router builder exposing the pricing and analysis endpoints.
pub fn analysis_router<R>(service: Arc<RentAnalysisService<R>>) -> Router
where
    R: AnalysisRepository + 'static,
{
    Router::new()
        .route("/api/v1/rent/estimate", post(estimate_handler::<R>))
        .route("/api/v1/rent/range", post(range_handler))
        .route("/api/v1/neighborhood/score", post(neighborhood_handler))
        .route("/api/v1/rent/compliance", post(compliance_handler::<R>))
        .route("/api/v1/listing/description", post(listing_handler::<R>))
        .route("/api/v1/rent/analyses", post(submit_handler::<R>))
        .route(
            "/api/v1/rent/analyses/:analysis_id",
            get(analysis_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn estimate_handler<R>(
    State(service): State<Arc<RentAnalysisService<R>>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Response, AppError>
where
    R: AnalysisRepository + 'static,
{
    let estimate = service.estimate(&request.subject, request.comparables, request.neighborhood)?;
    Ok((StatusCode::OK, Json(estimate)).into_response())
}

pub(crate) async fn range_handler(Json(request): Json<RangeRequest>) -> Result<Response, AppError> {
    let range = format_rent_range(request.estimated_rent, &request.confidence)?;
    Ok((StatusCode::OK, Json(range)).into_response())
}

pub(crate) async fn neighborhood_handler(
    Json(metrics): Json<NeighborhoodMetrics>,
) -> Result<Response, AppError> {
    metrics.validate()?;
    let score = compute_neighborhood_score(&metrics);
    Ok((StatusCode::OK, Json(score)).into_response())
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RentAnalysisService<R>>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Response, AppError>
where
    R: AnalysisRepository + 'static,
{
    let record = service.submit(request)?;
    Ok((StatusCode::ACCEPTED, Json(record.summary_view())).into_response())
}

pub(crate) async fn analysis_handler<R>(
    State(service): State<Arc<RentAnalysisService<R>>>,
    Path(analysis_id): Path<String>,
) -> Result<Response, AppError>
where
    R: AnalysisRepository + 'static,
{
    let record = service.get(&AnalysisId(analysis_id))?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

pub(crate) async fn compliance_handler<R>(
    State(service): State<Arc<RentAnalysisService<R>>>,
    Json(request): Json<ComplianceRequest>,
) -> Result<Response, AppError>
where
    R: AnalysisRepository + 'static,
{
    let review = service.check_rent_increase(&request)?;
    Ok((StatusCode::OK, Json(review)).into_response())
}

pub(crate) async fn listing_handler<R>(
    State(service): State<Arc<RentAnalysisService<R>>>,
    Json(request): Json<ListingRequest>,
) -> Result<Response, AppError>
where
    R: AnalysisRepository + 'static,
{
    let description = service.describe_listing(&request)?;
    Ok((StatusCode::OK, Json(description)).into_response())
}
