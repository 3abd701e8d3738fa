use axum::http::StatusCode;

/// Health check endpoint
///
/// Returns 200 OK while the service accepts requests. The hosted-payment SDK is not consulted.
#[utoipa::path(
    get,
    path = "/health_check",
    tag = "health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
