use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use planner::{CollectorConfig, PlanError, PlanRequest, PlanResult};
use serde::Serialize;
use venues::VenueAdapter;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Vec<Arc<dyn VenueAdapter>>>,
    pub collector_config: CollectorConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/plan", post(handle_plan))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn handle_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResult>, (StatusCode, Json<ErrorResponse>)> {
    planner::plan(request, &state.registry, state.collector_config)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!(error = %e, "plan request failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: plan_error_message(&e) }),
            )
        })
}

fn plan_error_message(e: &PlanError) -> String {
    e.to_string()
}
