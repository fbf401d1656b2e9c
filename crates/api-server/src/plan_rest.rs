//! Saved-plan REST API endpoints.

use crate::rest::{
    json_rejection, planner_error, query_rejection, run_calculation, ApiResult, AppState,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaign_core::{CampaignParameters, SavedPlan};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SavePlanRequest {
    pub owner: String,
    /// User-chosen plan name; saving again under the same name replaces it.
    pub name: String,
    pub parameters: CampaignParameters,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPlansQuery {
    pub owner: String,
}

/// GET /v1/plans?owner=: List an owner's saved plans.
#[utoipa::path(
    get,
    path = "/v1/plans",
    tag = "Plans",
    params(ListPlansQuery),
    responses(
        (status = 200, description = "Saved plans, most recent first", body = [SavedPlan]),
        (status = 400, description = "Missing owner", body = crate::rest::ErrorResponse),
    )
)]
pub async fn list_plans(
    State(state): State<AppState>,
    query: Result<Query<ListPlansQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SavedPlan>>> {
    let Query(query) = query.map_err(query_rejection)?;
    Ok(Json(state.store.list(&query.owner)))
}

/// POST /v1/plans: Compute a plan and save it under a name.
#[utoipa::path(
    post,
    path = "/v1/plans",
    tag = "Plans",
    request_body = SavePlanRequest,
    responses(
        (status = 201, description = "Plan computed and saved", body = SavedPlan),
        (status = 400, description = "Invalid parameters or malformed body", body = crate::rest::ErrorResponse),
        (status = 409, description = "Owner is at the saved-plan limit", body = crate::rest::ErrorResponse),
        (status = 422, description = "Campaign length not supported", body = crate::rest::ErrorResponse),
    )
)]
pub async fn save_plan(
    State(state): State<AppState>,
    body: Result<Json<SavePlanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SavedPlan>)> {
    let Json(req) = body.map_err(json_rejection)?;
    let result = run_calculation(&state.limits, req.parameters.clone()).map_err(planner_error)?;
    let plan = state
        .store
        .save(&req.owner, &req.name, req.parameters, result)
        .map_err(planner_error)?;
    metrics::counter!("planner.plans.saved").increment(1);
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /v1/plans/:id: Fetch a saved plan.
#[utoipa::path(
    get,
    path = "/v1/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Saved plan id")),
    responses(
        (status = 200, description = "Saved plan", body = SavedPlan),
        (status = 404, description = "No such plan", body = crate::rest::ErrorResponse),
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SavedPlan>> {
    state.store.get(id).map(Json).map_err(planner_error)
}

/// DELETE /v1/plans/:id: Delete a saved plan.
#[utoipa::path(
    delete,
    path = "/v1/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Saved plan id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such plan", body = crate::rest::ErrorResponse),
    )
)]
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete(id).map_err(planner_error)?;
    metrics::counter!("planner.plans.deleted").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/plans/:id/recalculate: Recompute a saved plan from its stored parameters.
#[utoipa::path(
    post,
    path = "/v1/plans/{id}/recalculate",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Saved plan id")),
    responses(
        (status = 200, description = "Plan with a fresh calculation", body = SavedPlan),
        (status = 422, description = "Stored parameters no longer plannable", body = crate::rest::ErrorResponse),
        (status = 404, description = "No such plan", body = crate::rest::ErrorResponse),
    )
)]
pub async fn recalculate_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SavedPlan>> {
    let limits = &state.limits;
    let plan = state
        .store
        .recalculate(id, |params| run_calculation(limits, params.clone()))
        .map_err(planner_error)?;
    info!(plan_id = %id, "Saved plan recalculated");
    Ok(Json(plan))
}
