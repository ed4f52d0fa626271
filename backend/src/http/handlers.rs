//! HTTP handlers for the REST API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{AnalyzeRequest, HealthResponse, ThumbnailRequest};
use super::error::AppError;
use super::state::AppState;
use crate::models::{AnalysisResult, AreaStat, Boundary, SeasonDates};
use crate::services::{self, thumbnail::THUMBNAIL_FORMAT, BUFFER_RADIUS_METERS};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        project: state.config.earthengine.project.clone(),
    })
}

/// POST /api/analyze
///
/// Crop vs idle acreage around a point for the summer and winter months.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> HandlerResult<AnalysisResult> {
    let Json(request) = payload?;
    let boundary = Boundary::around(request.position, BUFFER_RADIUS_METERS);

    tracing::info!(
        lat = request.position.lat,
        lng = request.position.lng,
        summer = %request.summer_date,
        winter = %request.winter_date,
        "Analyzing crop coverage"
    );

    let engine = state.engine.as_ref();
    let summer = services::crop_acreage(engine, &boundary, &request.summer_date).await?;
    let winter = services::crop_acreage(engine, &boundary, &request.winter_date).await?;

    Ok(Json(AnalysisResult {
        summer: AreaStat::from_estimate(summer),
        winter: AreaStat::from_estimate(winter),
        boundary: boundary.polygon_coordinates(),
        position: request.position,
        dates: SeasonDates {
            summer: request.summer_date,
            winter: request.winter_date,
        },
    }))
}

/// POST /thumbnail/{season}
///
/// PNG preview for one season. Answers an empty 404 when rendering failed.
pub async fn thumbnail(
    State(state): State<AppState>,
    Path(season): Path<String>,
    payload: Result<Json<ThumbnailRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let month_start = request
        .dates
        .get(&season)
        .ok_or_else(|| AppError::UnknownSeason(season.clone()))?;
    let boundary = Boundary::around(request.position, BUFFER_RADIUS_METERS);

    match services::fetch_thumbnail(state.engine.as_ref(), &boundary, month_start).await {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, THUMBNAIL_FORMAT.content_type())],
            bytes,
        )
            .into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
