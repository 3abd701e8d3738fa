use crate::domain::ObservedResult;
use crate::startup::AppState;
use crate::telemetry::error_chain_fmt;
use crate::trial::{ConcurrentReport, TrialError};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use std::error::Error;

/// Trials fired by the concurrent endpoint when `requests` is omitted
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

#[derive(serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConcurrentParameters {
    /// Number of trials to run in parallel
    pub requests: Option<usize>,
}

/// Failure details, surfaced verbatim.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    /// Top-level error message
    pub error: String,
    /// Full cause chain
    pub stack_trace: String,
    /// Message of the immediate cause, if any
    pub inner_exception: Option<String>,
}

#[derive(thiserror::Error)]
pub enum RaceTestError {
    #[error("`requests` must be between 1 and {max}, got {requested}")]
    InvalidRequestCount { requested: usize, max: usize },
    #[error(transparent)]
    TrialFailed(#[from] TrialError),
}

impl std::fmt::Debug for RaceTestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for RaceTestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RaceTestError::InvalidRequestCount { .. } => StatusCode::BAD_REQUEST,
            RaceTestError::TrialFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            stack_trace: format!("{:?}", self),
            inner_exception: self.source().map(|cause| cause.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a single race trial
///
/// Builds a fresh SDK configuration, serializes a charge with it and compares
/// the identifiers recovered from the payload with the ones supplied.
#[utoipa::path(
    get,
    path = "/debug/realex-race-test/api",
    tag = "race-test",
    responses(
        (status = 200, description = "Trial completed", body = ObservedResult),
        (status = 500, description = "The SDK call failed", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Race test: single trial", skip(state))]
pub async fn race_test_api(
    State(state): State<AppState>,
) -> Result<Json<ObservedResult>, RaceTestError> {
    let result = state.trials.run_trial().await.map_err(|e| {
        tracing::error!("Race trial failed: {:?}", e);
        e
    })?;
    Ok(Json(result))
}

/// Run race trials in parallel
///
/// Fires `requests` trials at once and cross-checks every payload against every input.
#[utoipa::path(
    get,
    path = "/debug/realex-race-test/api/concurrent",
    tag = "race-test",
    params(ConcurrentParameters),
    responses(
        (status = 200, description = "All trials finished", body = ConcurrentReport),
        (status = 400, description = "Request count out of range", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Race test: concurrent trials", skip(state, parameters))]
pub async fn race_test_concurrent(
    State(state): State<AppState>,
    Query(parameters): Query<ConcurrentParameters>,
) -> Result<Json<ConcurrentReport>, RaceTestError> {
    let max = state.trials.max_concurrent_requests();
    let requested = parameters
        .requests
        .unwrap_or_else(|| DEFAULT_CONCURRENT_REQUESTS.min(max));
    if requested == 0 || requested > max {
        return Err(RaceTestError::InvalidRequestCount { requested, max });
    }

    let report = state.trials.run_concurrent(requested).await;
    if report.race_condition_detected {
        tracing::error!(
            "{} of {} concurrent trials returned foreign identifiers",
            report.mismatches,
            report.requests
        );
    }
    Ok(Json(report))
}
