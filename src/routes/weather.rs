//! Current weather endpoint.
//!
//! GET /api/weather?lat=&lon=&city=

use axum::extract::{Query, State};
use axum::Json;

use super::{AppState, LocationParams};
use crate::errors::{AppError, ErrorResponse};
use crate::models::CurrentWeather;

const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch weather data";

/// Get current conditions for a location.
///
/// Coordinates take precedence over `city` when both are given. The body is
/// OpenWeatherMap's current weather response, unmodified, in metric units.
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "Current weather conditions", body = CurrentWeather),
        (status = 400, description = "Neither coordinates nor city supplied", body = ErrorResponse),
        (status = 500, description = "OpenWeatherMap request failed", body = ErrorResponse),
    )
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<CurrentWeather>, AppError> {
    let location = params.location()?;
    tracing::debug!("Fetching current weather for {:?}", location);

    let body = state
        .client
        .current_weather(&location)
        .await
        .map_err(AppError::upstream(UPSTREAM_FAILURE_MESSAGE))?;

    Ok(Json(CurrentWeather(body)))
}
