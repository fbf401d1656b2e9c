//! REST API handlers for budget calculation and operational endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campaign_core::config::PlannerConfig;
use campaign_core::{BudgetEstimate, CalculationResult, CampaignParameters, PlannerError};
use campaign_planner::{AllocationPolicy, PlanStore, ValidatedParameters, POLICIES};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PlanStore>,
    pub limits: PlannerConfig,
    pub node_id: String,
    pub start_time: Instant,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

fn error_body(status: StatusCode, error: &str, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

/// Map a planner error onto an HTTP status and error body.
pub fn planner_error(err: PlannerError) -> ApiError {
    let status = match &err {
        PlannerError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        PlannerError::UnsupportedCampaignLength { .. }
        | PlannerError::CampaignTooLong { .. }
        | PlannerError::Overflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlannerError::PlanNotFound(_) => StatusCode::NOT_FOUND,
        PlannerError::PlanLimitReached { .. } => StatusCode::CONFLICT,
    };
    metrics::counter!("planner.rejections", "code" => err.code()).increment(1);

    error_body(status, err.code(), err.to_string())
}

/// Malformed or incomplete JSON body.
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Request body rejected");
    metrics::counter!("planner.rejections", "code" => "invalid_body").increment(1);
    error_body(rejection.status(), "invalid_body", rejection.body_text())
}

/// Missing or malformed query string.
pub fn query_rejection(rejection: QueryRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Query string rejected");
    metrics::counter!("planner.rejections", "code" => "invalid_query").increment(1);
    error_body(rejection.status(), "invalid_query", rejection.body_text())
}

/// Validate raw input and apply the service's campaign-length ceiling.
pub fn validate_at_boundary(
    limits: &PlannerConfig,
    params: CampaignParameters,
) -> Result<ValidatedParameters, PlannerError> {
    let validated = campaign_planner::validate(params).map_err(|e| {
        warn!(error = %e, "Campaign parameters rejected");
        metrics::counter!("planner.validation_errors").increment(1);
        e
    })?;

    if validated.total_days() > limits.max_campaign_days {
        warn!(
            total_days = validated.total_days(),
            max = limits.max_campaign_days,
            "Campaign window exceeds configured maximum"
        );
        return Err(PlannerError::CampaignTooLong {
            days: validated.total_days(),
            max: limits.max_campaign_days,
        });
    }

    Ok(validated)
}

/// Validate and compute, recording timing. Shared with the saved-plan handlers.
pub fn run_calculation(
    limits: &PlannerConfig,
    params: CampaignParameters,
) -> Result<CalculationResult, PlannerError> {
    let validated = validate_at_boundary(limits, params)?;

    let started = Instant::now();
    let result = campaign_planner::compute(&validated).map_err(|e| {
        warn!(error = %e, total_days = validated.total_days(), "Budget calculation failed");
        e
    })?;
    metrics::histogram!("planner.calculate.duration_us")
        .record(started.elapsed().as_micros() as f64);
    metrics::counter!("planner.calculations", "policy" => result.policy.clone()).increment(1);

    Ok(result)
}

/// POST /v1/budget/calculate: Full phased allocation schedule.
#[utoipa::path(
    post,
    path = "/v1/budget/calculate",
    tag = "Budget",
    request_body = CampaignParameters,
    responses(
        (status = 200, description = "Allocation schedule", body = CalculationResult),
        (status = 400, description = "Invalid parameters or malformed body", body = ErrorResponse),
        (status = 422, description = "Campaign length not supported", body = ErrorResponse),
    )
)]
pub async fn handle_calculate(
    State(state): State<AppState>,
    body: Result<Json<CampaignParameters>, JsonRejection>,
) -> ApiResult<Json<CalculationResult>> {
    let Json(params) = body.map_err(json_rejection)?;
    run_calculation(&state.limits, params)
        .map(Json)
        .map_err(planner_error)
}

/// POST /v1/budget/estimate: Aggregate sizing without a schedule.
#[utoipa::path(
    post,
    path = "/v1/budget/estimate",
    tag = "Budget",
    request_body = CampaignParameters,
    responses(
        (status = 200, description = "Aggregate sizing", body = BudgetEstimate),
        (status = 400, description = "Invalid parameters or malformed body", body = ErrorResponse),
    )
)]
pub async fn handle_estimate(
    State(state): State<AppState>,
    body: Result<Json<CampaignParameters>, JsonRejection>,
) -> ApiResult<Json<BudgetEstimate>> {
    let Json(params) = body.map_err(json_rejection)?;
    let validated = validate_at_boundary(&state.limits, params).map_err(planner_error)?;
    let estimate = campaign_planner::engine::sizing(&validated).map_err(planner_error)?;
    metrics::counter!("planner.estimates").increment(1);
    Ok(Json(estimate))
}

/// GET /v1/budget/policies: The allocation-policy table.
#[utoipa::path(
    get,
    path = "/v1/budget/policies",
    tag = "Budget",
    responses((status = 200, description = "Allocation policies by campaign length"))
)]
pub async fn handle_policies() -> Json<&'static [AllocationPolicy]> {
    Json(POLICIES)
}

/// GET /health: Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        saved_plans: state.store.len(),
    })
}

/// GET /ready: Readiness probe for Kubernetes.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    // Nothing to warm up: the planner is pure and the store is in-process.
    StatusCode::OK
}

/// GET /live: Liveness probe for Kubernetes.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub saved_plans: usize,
}
