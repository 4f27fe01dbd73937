//! Forecast endpoint.
//!
//! GET /api/forecast?lat=&lon=&city=

use axum::extract::{Query, State};
use axum::Json;

use super::{AppState, LocationParams};
use crate::errors::{AppError, ErrorResponse};
use crate::models::ForecastPayload;
use crate::services::forecast::fetch_daily_forecast;

const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch forecast data";

/// Get the 5 day / 3 hour forecast for a location, grouped by day.
///
/// Returns OpenWeatherMap's forecast response with an extra `dailyForecasts`
/// array of `DailySummary` objects, one per UTC calendar day in the order
/// the days first appear.
#[utoipa::path(
    get,
    path = "/api/forecast",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "Forecast with daily summaries", body = ForecastPayload),
        (status = 400, description = "Neither coordinates nor city supplied", body = ErrorResponse),
        (status = 500, description = "OpenWeatherMap request failed", body = ErrorResponse),
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<ForecastPayload>, AppError> {
    let location = params.location()?;
    tracing::debug!("Fetching forecast for {:?}", location);

    let payload = fetch_daily_forecast(&state.client, &location)
        .await
        .map_err(AppError::upstream(UPSTREAM_FAILURE_MESSAGE))?;

    Ok(Json(payload))
}
