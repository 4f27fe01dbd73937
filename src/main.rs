// Weather Proxy API v0.1
use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::openweather::OpenWeatherClient;

/// Weather Proxy API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Proxy API",
        version = "0.1.0",
        description = "Current weather, 5-day forecast and location search for the weather \
            frontend. Every request is forwarded to OpenWeatherMap in metric units; forecast \
            responses additionally carry per-day summaries (temperature range, representative \
            condition and intraday time points).",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Weather", description = "Current conditions and forecasts"),
        (name = "Locations", description = "Place name search"),
    ),
    paths(
        routes::health::liveness,
        routes::weather::get_current_weather,
        routes::forecast::get_forecast,
        routes::locations::search_locations,
    ),
    components(
        schemas(
            models::CurrentWeather,
            models::ForecastPayload,
            models::DailySummary,
            models::TempRange,
            models::TimePoint,
            models::WeatherCondition,
            models::GeoLocation,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_proxy_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if config.uses_placeholder_key() {
        tracing::warn!(
            "WEATHER_API_KEY is not set; using placeholder key, all upstream requests will fail"
        );
    }

    let client = OpenWeatherClient::new(&config)?;
    let app = routes::router(AppState::new(&config, client));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
