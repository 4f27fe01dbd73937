//! OpenWeatherMap client.
//!
//! Wraps the current weather and 5 day / 3 hour forecast endpoints
//! (`/data/2.5`) and direct geocoding (`/geo/1.0/direct`).
//! See: https://openweathermap.org/api
//!
//! Every call is a single GET with metric units and the API key appended.
//! Nothing is retried or cached.

use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::errors::UpstreamError;
use crate::models::{GeoLocation, LocationQuery};

/// Number of matches requested from the geocoding endpoint.
pub const LOCATION_SEARCH_LIMIT: usize = 5;

/// Client for the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    geo_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &AppConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(UpstreamError::ClientBuild)?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geo_url: config.geo_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions for a location, returned as the raw upstream JSON.
    pub async fn current_weather(
        &self,
        location: &LocationQuery,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/weather", self.base_url);
        self.get_json("weather", &url, self.weather_params(location))
            .await
    }

    /// 5 day / 3 hour forecast for a location, returned as the raw upstream JSON.
    pub async fn forecast(
        &self,
        location: &LocationQuery,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/forecast", self.base_url);
        self.get_json("forecast", &url, self.weather_params(location))
            .await
    }

    /// Resolve a free-text place name to at most five candidate locations.
    pub async fn search_locations(&self, query: &str) -> Result<Vec<GeoLocation>, UpstreamError> {
        let url = format!("{}/direct", self.geo_url);
        let params = vec![
            ("q", query.to_string()),
            ("limit", LOCATION_SEARCH_LIMIT.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let mut locations: Vec<GeoLocation> = self.get_json("geocoding", &url, params).await?;
        locations.truncate(LOCATION_SEARCH_LIMIT);
        Ok(locations)
    }

    fn weather_params(&self, location: &LocationQuery) -> Vec<(&'static str, String)> {
        let mut params = location.query_pairs();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| UpstreamError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(UpstreamError::status(endpoint, status, &body));
        }

        serde_json::from_str(&body).map_err(|source| UpstreamError::Decode { endpoint, source })
    }
}
