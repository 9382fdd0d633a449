use axum::http::StatusCode;

/// Health check endpoint
///
/// Returns 200 OK while the server is running, whether or not the sensors
/// API is reachable (that shows up as the card going offline instead).
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
