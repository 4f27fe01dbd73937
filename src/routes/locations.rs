//! Location search endpoint.
//!
//! GET /api/locations?query=

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{present, GeoLocation};

const MISSING_QUERY_MESSAGE: &str = "Search query is required";
const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to search locations";

#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationSearchQuery {
    /// Free-text place name (e.g. "Zurich" or "Springfield, US")
    pub query: Option<String>,
}

/// Search for places matching a name.
///
/// Returns up to five matches from OpenWeatherMap's direct geocoding API,
/// in the order the provider ranks them.
#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    params(LocationSearchQuery),
    responses(
        (status = 200, description = "Matching locations", body = Vec<GeoLocation>),
        (status = 400, description = "Empty or missing query", body = ErrorResponse),
        (status = 500, description = "OpenWeatherMap request failed", body = ErrorResponse),
    )
)]
pub async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationSearchQuery>,
) -> Result<Json<Vec<GeoLocation>>, AppError> {
    let query = present(params.query.as_deref())
        .ok_or_else(|| AppError::Validation(MISSING_QUERY_MESSAGE.to_string()))?;

    let locations = state
        .client
        .search_locations(query)
        .await
        .map_err(AppError::upstream(UPSTREAM_FAILURE_MESSAGE))?;

    Ok(Json(locations))
}
