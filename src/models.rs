//! Request and forecast types shared by the client, aggregator and routes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::errors::AppError;

pub const MISSING_LOCATION_MESSAGE: &str = "Either coordinates or city name is required";

/// Where to look up weather: a point, or a place name resolved upstream.
///
/// Values are kept exactly as the caller sent them; OpenWeatherMap decides
/// whether they are valid.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: String, lon: String },
    PlaceName(String),
}

impl LocationQuery {
    /// Build a query from raw request parameters.
    ///
    /// A parameter counts as absent only when missing or empty. Coordinates
    /// need both `lat` and `lon` and win over `city` when both forms are
    /// supplied.
    pub fn from_params(
        lat: Option<&str>,
        lon: Option<&str>,
        city: Option<&str>,
    ) -> Result<Self, AppError> {
        if let (Some(lat), Some(lon)) = (present(lat), present(lon)) {
            return Ok(LocationQuery::Coordinates {
                lat: lat.to_string(),
                lon: lon.to_string(),
            });
        }

        present(city)
            .map(|c| LocationQuery::PlaceName(c.to_string()))
            .ok_or_else(|| AppError::Validation(MISSING_LOCATION_MESSAGE.to_string()))
    }

    /// Upstream query parameters selecting this location.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.clone()), ("lon", lon.clone())]
            }
            LocationQuery::PlaceName(name) => vec![("q", name.clone())],
        }
    }
}

/// `None` for a missing or empty parameter.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

// --- OpenWeatherMap forecast sample (one entry of `list`) ---

/// Weather condition as reported upstream (e.g. 800 / "Clear" / "clear sky").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherCondition {
    /// OpenWeatherMap condition code
    pub id: i64,
    /// Condition group (e.g. "Rain")
    pub main: String,
    /// Condition description (e.g. "light rain")
    pub description: String,
    /// Icon identifier (e.g. "10d")
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleWind {
    pub speed: f64,
}

/// A single 3-hour forecast data point.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp (seconds, UTC)
    pub dt: i64,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub wind: SampleWind,
}

impl ForecastSample {
    /// The condition the aggregator uses: the first one listed.
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }
}

// --- Aggregated output ---

/// Temperature range across all samples of a day, in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TempRange {
    pub min: f64,
    pub max: f64,
}

/// One intraday sample inside a `DailySummary`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimePoint {
    /// 12-hour UTC time label (e.g. "03:00 PM")
    pub time: String,
    /// Temperature in Celsius
    pub temp: f64,
    pub weather: Option<WeatherCondition>,
}

/// Per-calendar-day summary of forecast samples.
///
/// `weather`, `humidity` and `wind` come from the first sample of the day and
/// are not aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// UTC calendar date (YYYY-MM-DD)
    pub date: String,
    /// Short weekday name (e.g. "Mon")
    pub day: String,
    pub temps: TempRange,
    pub weather: Option<WeatherCondition>,
    /// Relative humidity percentage of the first sample
    pub humidity: u8,
    /// Wind speed in m/s of the first sample
    pub wind: f64,
    /// Samples of the day in the order they were received
    pub time_points: Vec<TimePoint>,
}

/// A geocoding match returned by location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    /// Place name
    pub name: String,
    /// Place name in other languages, keyed by language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_names: Option<HashMap<String, String>>,
    /// Latitude (WGS84)
    pub lat: f64,
    /// Longitude (WGS84)
    pub lon: f64,
    /// ISO 3166 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// State or region, when the provider knows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Current conditions, passed through verbatim from OpenWeatherMap.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(value_type = Object)]
pub struct CurrentWeather(pub serde_json::Value);

/// The upstream forecast payload with an added `dailyForecasts` array.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(value_type = Object)]
pub struct ForecastPayload(pub serde_json::Value);
