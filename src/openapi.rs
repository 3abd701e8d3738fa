use crate::domain::ObservedResult;
use crate::routes::{ErrorResponse, health_check, race_test};
use crate::trial::ConcurrentReport;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "hpp_race_probe",
        description = "Diagnostic endpoints probing a hosted-payment SDK for cross-request leaks"
    ),
    paths(
        health_check::health_check,
        race_test::race_test_api,
        race_test::race_test_concurrent,
    ),
    components(schemas(ObservedResult, ConcurrentReport, ErrorResponse)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "race-test", description = "Hosted-payment race trials"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
