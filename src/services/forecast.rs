//! Forecast aggregation service.
//!
//! Regroups the flat list of 3-hour samples from the forecast endpoint into
//! per-day summaries and attaches them to the upstream payload as
//! `dailyForecasts`.
//!
//! Days are UTC calendar days derived directly from each sample's `dt`.
//! A day's `weather`, `humidity` and `wind` are those of its first sample;
//! only the temperature range is aggregated. Both are part of the response
//! contract the frontend relies on.

use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::UpstreamError;
use crate::helpers::{iso_date, time_label, unix_to_utc, weekday_short};
use crate::models::{
    DailySummary, ForecastPayload, ForecastSample, LocationQuery, TempRange, TimePoint,
};
use crate::services::openweather::OpenWeatherClient;

/// Key under which the daily summaries are added to the forecast payload.
pub const DAILY_FORECASTS_KEY: &str = "dailyForecasts";

/// The part of the forecast payload the aggregator needs.
#[derive(Debug, Deserialize)]
struct ForecastList {
    list: Vec<ForecastSample>,
}

/// Group forecast samples by UTC calendar day.
///
/// Single left-to-right pass. Days appear in the order they are first seen;
/// time points within a day keep input order. Every sample lands in exactly
/// one summary.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Result<Vec<DailySummary>, UpstreamError> {
    let mut days: Vec<DailySummary> = Vec::new();
    let mut index_by_date: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let at = unix_to_utc(sample.dt).ok_or(UpstreamError::InvalidTimestamp(sample.dt))?;
        let date = iso_date(at);
        let condition = sample.condition().cloned();

        let idx = match index_by_date.get(&date).copied() {
            Some(idx) => {
                let temps = &mut days[idx].temps;
                temps.min = temps.min.min(sample.main.temp_min);
                temps.max = temps.max.max(sample.main.temp_max);
                idx
            }
            None => {
                days.push(DailySummary {
                    date: date.clone(),
                    day: weekday_short(at),
                    temps: TempRange {
                        min: sample.main.temp_min,
                        max: sample.main.temp_max,
                    },
                    weather: condition.clone(),
                    humidity: sample.main.humidity,
                    wind: sample.wind.speed,
                    time_points: Vec::new(),
                });
                index_by_date.insert(date, days.len() - 1);
                days.len() - 1
            }
        };

        days[idx].time_points.push(TimePoint {
            time: time_label(at),
            temp: sample.main.temp,
            weather: condition,
        });
    }

    Ok(days)
}

/// Fetch the forecast for a location and add `dailyForecasts` to it.
///
/// The rest of the upstream payload is passed through untouched.
pub async fn fetch_daily_forecast(
    client: &OpenWeatherClient,
    location: &LocationQuery,
) -> Result<ForecastPayload, UpstreamError> {
    let mut payload = client.forecast(location).await?;
    let daily = summarize_payload(&payload)?;

    if let serde_json::Value::Object(map) = &mut payload {
        map.insert(DAILY_FORECASTS_KEY.to_string(), daily);
    }

    Ok(ForecastPayload(payload))
}

/// Aggregate the `list` of a raw forecast payload into JSON day summaries.
fn summarize_payload(payload: &serde_json::Value) -> Result<serde_json::Value, UpstreamError> {
    let decode = |source| UpstreamError::Decode {
        endpoint: "forecast",
        source,
    };

    let forecast = ForecastList::deserialize(payload).map_err(decode)?;
    let daily = aggregate_daily(&forecast.list)?;
    tracing::debug!(
        "Aggregated {} forecast samples into {} days",
        forecast.list.len(),
        daily.len()
    );
    serde_json::to_value(daily).map_err(decode)
}
