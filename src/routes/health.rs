/// Liveness message served at the root path.
pub const LIVENESS_MESSAGE: &str = "Weather API is running!";

/// Liveness check.
///
/// Returns a fixed plain-text message. Does not contact OpenWeatherMap, so a
/// 200 here says nothing about upstream availability.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = String, content_type = "text/plain"),
    )
)]
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}
