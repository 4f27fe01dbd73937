//! HTTP routing.
//!
//! - GET /                  liveness message
//! - GET /api/weather       current conditions
//! - GET /api/forecast      forecast with daily summaries
//! - GET /api/locations     place name search
//!
//! Requests carrying an `Origin` header outside the allow-list are rejected
//! before routing. Requests without one (curl, mobile apps) pass.

pub mod forecast;
pub mod health;
pub mod locations;
pub mod weather;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::LocationQuery;
use crate::services::openweather::OpenWeatherClient;
use crate::ApiDoc;

/// Shared application state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: OpenWeatherClient,
    pub(crate) allowed_origins: Arc<[HeaderValue]>,
}

impl AppState {
    pub(crate) fn new(config: &AppConfig, client: OpenWeatherClient) -> Self {
        Self {
            client,
            allowed_origins: config.allowed_origins.clone().into(),
        }
    }
}

/// Location parameters shared by the weather and forecast endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationParams {
    /// Latitude (used together with `lon`)
    pub lat: Option<String>,
    /// Longitude (used together with `lat`)
    pub lon: Option<String>,
    /// Place name, used when coordinates are absent
    pub city: Option<String>,
}

impl LocationParams {
    fn location(&self) -> Result<LocationQuery, AppError> {
        LocationQuery::from_params(
            self.lat.as_deref(),
            self.lon.as_deref(),
            self.city.as_deref(),
        )
    }
}

/// Build the full application router.
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.iter().cloned()))
        .allow_methods([Method::GET])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(health::liveness))
        .route("/api/weather", get(weather::get_current_weather))
        .route("/api/forecast", get(forecast::get_forecast))
        .route("/api/locations", get(locations::search_locations))
        .with_state(state.clone())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Outside the CORS layer so disallowed preflights are rejected too
        .layer(middleware::from_fn_with_state(state, enforce_allowed_origin))
        .layer(TraceLayer::new_for_http())
}

/// Reject requests whose `Origin` is not exactly one of the allowed origins.
async fn enforce_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(origin) = request.headers().get(ORIGIN) {
        if !state.allowed_origins.iter().any(|allowed| allowed == origin) {
            return Err(AppError::OriginNotAllowed(
                String::from_utf8_lossy(origin.as_bytes()).into_owned(),
            ));
        }
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderMap, StatusCode};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALLOWED: &str = "http://localhost:5173";

    // 2024-01-15T00:00:00Z
    const MONDAY: i64 = 1_705_276_800;

    fn app_for(server: &MockServer) -> Router {
        let config = AppConfig {
            port: 0,
            api_key: "test-key".to_string(),
            base_url: format!("{}/data/2.5", server.uri()),
            geo_url: format!("{}/geo/1.0", server.uri()),
            allowed_origins: vec![HeaderValue::from_static(ALLOWED)],
        };
        let client = OpenWeatherClient::new(&config).unwrap();
        router(AppState::new(&config, client))
    }

    async fn send(app: Router, request: axum::http::Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = axum::http::Request::get(uri).body(Body::empty()).unwrap();
        let (status, _, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Mount a catch-all mock that fails the test if any upstream call is made.
    async fn forbid_upstream_calls(server: &MockServer) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(server)
            .await;
    }

    fn forecast_entry(dt: i64, temp: f64, min: f64, max: f64) -> serde_json::Value {
        serde_json::json!({
            "dt": dt,
            "main": { "temp": temp, "feels_like": temp - 2.0, "temp_min": min, "temp_max": max, "humidity": 76 },
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10n" }],
            "wind": { "speed": 3.6, "deg": 210 }
        })
    }

    #[tokio::test]
    async fn test_liveness() {
        let server = MockServer::start().await;
        let request = axum::http::Request::get("/").body(Body::empty()).unwrap();

        let (status, _, body) = send(app_for(&server), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, health::LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_weather_requires_location() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        let (status, body) = get(app_for(&server), "/api/weather").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either coordinates or city name is required");
    }

    #[tokio::test]
    async fn test_weather_lat_without_lon_is_rejected() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        let (status, body) = get(app_for(&server), "/api/weather?lat=51.5&city=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either coordinates or city name is required");
    }

    #[tokio::test]
    async fn test_weather_passes_upstream_body_through() {
        let server = MockServer::start().await;
        let upstream = serde_json::json!({
            "name": "London",
            "main": { "temp": 11.2, "humidity": 80 },
            "weather": [{ "id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d" }]
        });

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/weather?city=London").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, upstream);
    }

    #[tokio::test]
    async fn test_weather_upstream_failure_is_generic_500() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/weather?lat=1&lon=2").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch weather data" }));
    }

    #[tokio::test]
    async fn test_weather_non_numeric_coordinates_go_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "abc"))
            .and(query_param("lon", "def"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "cod": "400",
                "message": "wrong latitude"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/weather?lat=abc&lon=def").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch weather data" }));
    }

    #[tokio::test]
    async fn test_weather_forwards_coordinates_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.50000"))
            .and(query_param("lon", "1e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "Somewhere" })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/weather?lat=51.50000&lon=1e1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Somewhere");
    }

    #[tokio::test]
    async fn test_weather_whitespace_city_is_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "  "))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/weather?city=%20%20").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch weather data");
    }

    #[tokio::test]
    async fn test_forecast_groups_samples_by_day() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cod": "200",
                "cnt": 3,
                "list": [
                    forecast_entry(MONDAY + 9 * 3600, 7.0, 6.5, 7.2),
                    forecast_entry(MONDAY + 12 * 3600, 9.5, 8.8, 10.1),
                    forecast_entry(MONDAY + 15 * 3600, 8.0, 5.9, 8.4)
                ],
                "city": { "name": "London", "country": "GB" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) =
            get(app_for(&server), "/api/forecast?lat=51.5&lon=-0.12&city=Paris").await;

        assert_eq!(status, StatusCode::OK);
        // Upstream payload is preserved
        assert_eq!(body["city"]["name"], "London");
        assert_eq!(body["list"].as_array().unwrap().len(), 3);

        let daily = body["dailyForecasts"].as_array().unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0]["date"], "2024-01-15");
        assert_eq!(daily[0]["day"], "Mon");
        assert_eq!(daily[0]["temps"]["min"], 5.9);
        assert_eq!(daily[0]["temps"]["max"], 10.1);
        assert_eq!(daily[0]["humidity"], 76);
        assert_eq!(daily[0]["wind"], 3.6);
        assert_eq!(daily[0]["weather"]["description"], "light rain");

        let times: Vec<&str> = daily[0]["timePoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["time"].as_str().unwrap())
            .collect();
        assert_eq!(times, vec!["09:00 AM", "12:00 PM", "03:00 PM"]);
        assert_eq!(daily[0]["timePoints"][1]["temp"], 9.5);
    }

    #[tokio::test]
    async fn test_forecast_requires_location() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        let (status, body) = get(app_for(&server), "/api/forecast?lat=&lon=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either coordinates or city name is required");
    }

    #[tokio::test]
    async fn test_forecast_malformed_payload_is_500() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "200" })),
            )
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/forecast?city=London").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch forecast data" }));
    }

    #[tokio::test]
    async fn test_locations_requires_query() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        for uri in ["/api/locations", "/api/locations?query="] {
            let (status, body) = get(app_for(&server), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Search query is required");
        }
    }

    #[tokio::test]
    async fn test_locations_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Zurich"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "Zurich", "lat": 47.3744, "lon": 8.5410, "country": "CH", "state": "Zurich" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/locations?query=Zurich").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                { "name": "Zurich", "lat": 47.3744, "lon": 8.5410, "country": "CH", "state": "Zurich" }
            ])
        );
    }

    #[tokio::test]
    async fn test_locations_whitespace_query_is_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", " "))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/locations?query=%20").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_locations_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, body) = get(app_for(&server), "/api/locations?query=Zurich").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to search locations" }));
    }

    #[tokio::test]
    async fn test_disallowed_origin_is_rejected_before_routing() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        let request = axum::http::Request::get("/api/weather?city=London")
            .header(ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(app_for(&server), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(headers.get("access-control-allow-origin").is_none());
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Not allowed by CORS");
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "London" })))
            .expect(1)
            .mount(&server)
            .await;

        let request = axum::http::Request::get("/api/weather?city=London")
            .header(ORIGIN, ALLOWED)
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(app_for(&server), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], ALLOWED);
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let server = MockServer::start().await;
        forbid_upstream_calls(&server).await;

        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/forecast")
            .header(ORIGIN, ALLOWED)
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(app_for(&server), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], ALLOWED);
    }

    #[tokio::test]
    async fn test_preflight_from_disallowed_origin() {
        let server = MockServer::start().await;

        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/forecast")
            .header(ORIGIN, "https://evil.example")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app_for(&server), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
