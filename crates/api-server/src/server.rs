//! API server: builds the router and serves HTTP and metrics.

use crate::plan_rest;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_planner::PlanStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the full application router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Budget calculation
        .route("/v1/budget/calculate", post(rest::handle_calculate))
        .route("/v1/budget/estimate", post(rest::handle_estimate))
        .route("/v1/budget/policies", get(rest::handle_policies))
        // Saved plans
        .route(
            "/v1/plans",
            get(plan_rest::list_plans).post(plan_rest::save_plan),
        )
        .route(
            "/v1/plans/:id",
            get(plan_rest::get_plan).delete(plan_rest::delete_plan),
        )
        .route("/v1/plans/:id/recalculate", post(plan_rest::recalculate_plan))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    store: Arc<PlanStore>,
}

impl ApiServer {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(PlanStore::new(config.planner.max_plans_per_owner));
        Self { config, store }
    }

    pub fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            limits: self.config.planner.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = build_router(self.state());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(
            addr = %addr,
            max_campaign_days = self.config.planner.max_campaign_days,
            max_plans_per_owner = self.config.planner.max_plans_per_owner,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Install the Prometheus recorder and its HTTP listener on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use campaign_core::config::PlannerConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with_limits(limits: PlannerConfig) -> Router {
        build_router(AppState {
            store: Arc::new(PlanStore::new(limits.max_plans_per_owner)),
            limits,
            node_id: "test-node".to_string(),
            start_time: Instant::now(),
        })
    }

    fn app() -> Router {
        app_with_limits(PlannerConfig::default())
    }

    fn campaign(start: &str, end: &str) -> Value {
        json!({
            "start_date": start,
            "end_date": end,
            "target_revenue": 150000,
            "target_aov": 1000,
            "target_conversion_rate_pct": 2,
            "cost_per_click": 5
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    // 1. Budget endpoints ----------------------------------------------------

    #[tokio::test]
    async fn test_calculate_short_campaign() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/v1/budget/calculate",
            Some(campaign("2024-11-05", "2024-11-11")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["policy"], "short_burst");
        assert_eq!(body["total_budget"], 37500);
        assert_eq!(body["required_traffic"], 7500);
        assert_eq!(body["periods"].as_array().unwrap().len(), 3);
        assert_eq!(body["daily_breakdown"].as_array().unwrap().len(), 7);
        assert_eq!(body["daily_breakdown"][0]["date"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_calculate_rejects_uncovered_length() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/v1/budget/calculate",
            Some(campaign("2024-11-11", "2024-11-12")),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "unsupported_campaign_length");
    }

    #[tokio::test]
    async fn test_calculate_rejects_invalid_parameters() {
        let app = app();
        let mut params = campaign("2024-11-01", "2024-11-14");
        params["target_aov"] = json!(0);

        let (status, body) = send(&app, "POST", "/v1/budget/calculate", Some(params)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameter");
        assert!(body["message"].as_str().unwrap().contains("target_aov"));
    }

    #[tokio::test]
    async fn test_campaign_length_ceiling() {
        let app = app_with_limits(PlannerConfig {
            max_campaign_days: 30,
            max_plans_per_owner: 10,
        });
        let (status, body) = send(
            &app,
            "POST",
            "/v1/budget/calculate",
            Some(campaign("2024-01-01", "2024-03-01")),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "campaign_too_long");
    }

    #[tokio::test]
    async fn test_estimate_single_day() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/v1/budget/estimate",
            Some(campaign("2024-11-11", "2024-11-11")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_days"], 1);
        assert_eq!(body["total_budget"], 37500);
        assert_eq!(body["average_daily_budget"], 37500);
    }

    #[tokio::test]
    async fn test_policies_endpoint() {
        let app = app();
        let (status, body) = send(&app, "GET", "/v1/budget/policies", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["three_day", "short_burst", "full_cycle"]);
    }

    // 2. Saved plans ---------------------------------------------------------

    #[tokio::test]
    async fn test_saved_plan_lifecycle() {
        let app = app();
        let request = json!({
            "owner": "alice",
            "name": "Singles Day",
            "parameters": campaign("2024-11-01", "2024-11-14"),
        });

        let (status, saved) = send(&app, "POST", "/v1/plans", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["result"]["policy"], "full_cycle");
        let id = saved["id"].as_str().unwrap().to_string();

        let (status, listed) = send(&app, "GET", "/v1/plans?owner=alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, fetched) = send(&app, "GET", &format!("/v1/plans/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, saved);

        let (status, recalculated) =
            send(&app, "POST", &format!("/v1/plans/{id}/recalculate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recalculated["result"], saved["result"]);

        let (status, _) = send(&app, "DELETE", &format!("/v1/plans/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", &format!("/v1/plans/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "plan_not_found");
    }

    #[tokio::test]
    async fn test_saved_plan_limit() {
        let app = app_with_limits(PlannerConfig {
            max_campaign_days: 366,
            max_plans_per_owner: 1,
        });
        let save = |name: &str| {
            json!({
                "owner": "bob",
                "name": name,
                "parameters": campaign("2024-11-05", "2024-11-11"),
            })
        };

        let (status, _) = send(&app, "POST", "/v1/plans", Some(save("first"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "POST", "/v1/plans", Some(save("second"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "plan_limit_reached");
    }

    #[tokio::test]
    async fn test_save_rejects_unsupported_campaign() {
        let app = app();
        let request = json!({
            "owner": "alice",
            "name": "flash",
            "parameters": campaign("2024-11-11", "2024-11-11"),
        });

        let (status, _) = send(&app, "POST", "/v1/plans", Some(request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, listed) = send(&app, "GET", "/v1/plans?owner=alice", None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    // 3. Request rejections --------------------------------------------------

    #[tokio::test]
    async fn test_malformed_body_returns_error_json() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/budget/calculate")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid_body");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_returns_error_json() {
        let app = app();
        let mut params = campaign("2024-11-05", "2024-11-11");
        params.as_object_mut().unwrap().remove("cost_per_click");

        let (status, body) = send(&app, "POST", "/v1/budget/estimate", Some(params)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_body");
        assert!(body["message"].as_str().unwrap().contains("cost_per_click"));

        let request = json!({ "owner": "alice", "parameters": campaign("2024-11-05", "2024-11-11") });
        let (status, body) = send(&app, "POST", "/v1/plans", Some(request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_body");
    }

    #[tokio::test]
    async fn test_list_without_owner_returns_error_json() {
        let app = app();
        let (status, body) = send(&app, "GET", "/v1/plans", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_query");
    }

    #[tokio::test]
    async fn test_recalculate_through_router() {
        let app = app();
        let request = json!({
            "owner": "alice",
            "name": "Q4",
            "parameters": campaign("2024-11-01", "2024-11-14"),
        });
        let (status, saved) = send(&app, "POST", "/v1/plans", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = saved["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, "POST", &format!("/v1/plans/{id}/recalculate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["total_days"], 14);

        let missing = uuid::Uuid::new_v4();
        let (status, body) =
            send(&app, "POST", &format!("/v1/plans/{missing}/recalculate"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "plan_not_found");
    }

    // 4. Operations ----------------------------------------------------------

    #[tokio::test]
    async fn test_health_and_probes() {
        let app = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["node_id"], "test-node");

        assert_eq!(send(&app, "GET", "/ready", None).await.0, StatusCode::OK);
        assert_eq!(send(&app, "GET", "/live", None).await.0, StatusCode::OK);
    }
}
