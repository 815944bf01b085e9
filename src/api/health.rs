use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::resources::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    dataset: ComponentHealth,
    model: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn healthy(detail: String) -> Self {
        Self {
            status: "healthy".to_string(),
            detail: Some(detail),
        }
    }

    fn unhealthy(detail: &str) -> Self {
        Self {
            status: "unhealthy".to_string(),
            detail: Some(detail.to_string()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

fn check_dataset(state: &AppState) -> ComponentHealth {
    if !state.resources.is_dataset_loaded() {
        return ComponentHealth::unhealthy("dataset not loaded");
    }
    match state.resources.dataset() {
        Ok(ds) => ComponentHealth::healthy(format!("{} rows from {}", ds.len(), ds.source())),
        Err(e) => ComponentHealth::unhealthy(&e.to_string()),
    }
}

fn check_model(state: &AppState) -> ComponentHealth {
    if !state.resources.is_model_loaded() {
        return ComponentHealth::unhealthy("model not loaded");
    }
    match state.resources.model() {
        Ok(model) => ComponentHealth::healthy(model.metadata().model_id.clone()),
        Err(e) => ComponentHealth::unhealthy(&e.to_string()),
    }
}

/// GET /health - Health check endpoint
///
/// Reports whether the dataset and the load model are in memory. Never
/// triggers a load itself.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = check_dataset(&state);
    let model = check_model(&state);
    let all_healthy = dataset.is_healthy() && model.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { dataset, model },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// GET /health/ready - Readiness probe
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.resources.is_dataset_loaded() && state.resources.is_model_loaded() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
