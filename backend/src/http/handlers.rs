//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer or the geocoding client.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::dto::{
    District, GeocodeRequest, GeocodeResult, HealthResponse, NearbyQuery, NearbySchool, Program,
    SchoolDetail,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{NearbyFilter, SchoolId};
use crate::db::services as db_services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Always answers; the `database` field reports store reachability.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse { ok: true, database }))
}

// =============================================================================
// Schools
// =============================================================================

/// GET /schools/nearby
///
/// Schools within `radius_km` of (`lat`, `lng`), nearest first.
pub async fn nearby_schools(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> HandlerResult<Vec<NearbySchool>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let filter = NearbyFilter::from(query);

    let schools = db_services::nearby_schools(state.repository.as_ref(), &filter).await?;
    Ok(Json(schools))
}

/// GET /schools/{school_id}
pub async fn school_detail(
    State(state): State<AppState>,
    school_id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<SchoolDetail> {
    let Path(school_id) = school_id.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let detail =
        db_services::school_detail(state.repository.as_ref(), SchoolId::new(school_id)).await?;
    Ok(Json(detail))
}

// =============================================================================
// Reference Lists
// =============================================================================

/// GET /districts
pub async fn list_districts(State(state): State<AppState>) -> HandlerResult<Vec<District>> {
    let districts = db_services::list_districts(state.repository.as_ref()).await?;
    Ok(Json(districts))
}

/// GET /programs
pub async fn list_programs(State(state): State<AppState>) -> HandlerResult<Vec<Program>> {
    let programs = db_services::list_programs(state.repository.as_ref()).await?;
    Ok(Json(programs))
}

// =============================================================================
// Geocoding
// =============================================================================

/// POST /geocode
pub async fn geocode(
    State(state): State<AppState>,
    body: Result<Json<GeocodeRequest>, JsonRejection>,
) -> HandlerResult<GeocodeResult> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = state.geocoder.geocode(&request.address).await?;
    Ok(Json(result))
}
