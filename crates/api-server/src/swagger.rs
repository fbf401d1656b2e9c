//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaign Budget Planner API",
        version = "0.1.0",
        description = "Sizes advertising campaigns from a revenue target and splits the spend into a phased, day-by-day schedule.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Budget", description = "Budget sizing and allocation schedules"),
        (name = "Plans", description = "Named, saved plan snapshots"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Budget
        crate::rest::handle_calculate,
        crate::rest::handle_estimate,
        crate::rest::handle_policies,
        // Plans
        crate::plan_rest::list_plans,
        crate::plan_rest::save_plan,
        crate::plan_rest::get_plan,
        crate::plan_rest::delete_plan,
        crate::plan_rest::recalculate_plan,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        campaign_core::CampaignParameters,
        campaign_core::CalculationResult,
        campaign_core::BudgetEstimate,
        campaign_core::Period,
        campaign_core::DailyAllocation,
        campaign_core::SavedPlan,
        crate::plan_rest::SavePlanRequest,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
