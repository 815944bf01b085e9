use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    dataset::{Dataset, DatasetOverview, PreviewTable},
    demand::{predict_future_demand, Month, PredictionReport, PredictionRequest},
    ml::{LoadPredictor, ModelMetadata},
    resources::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/preview", get(get_preview))
        .route("/options", get(get_options))
        .route("/model", get(get_model))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Dataset handle; a first load runs on the blocking pool.
async fn dataset(state: &AppState) -> Result<Arc<Dataset>, ApiError> {
    let resources = Arc::clone(&state.resources);
    let loaded = if resources.is_dataset_loaded() {
        resources.dataset()
    } else {
        tokio::task::spawn_blocking(move || resources.dataset())
            .await
            .map_err(anyhow::Error::from)?
    };
    loaded.map_err(|e| ApiError::ServiceUnavailable(format!("{:#}", e)))
}

async fn model(state: &AppState) -> Result<Arc<dyn LoadPredictor>, ApiError> {
    let resources = Arc::clone(&state.resources);
    let loaded = if resources.is_model_loaded() {
        resources.model()
    } else {
        tokio::task::spawn_blocking(move || resources.model())
            .await
            .map_err(anyhow::Error::from)?
    };
    loaded.map_err(|e| ApiError::ServiceUnavailable(format!("{:#}", e)))
}

#[cfg_attr(feature = "swagger", utoipa::path(get, path = "/api/v1/healthz", responses((status = 200))))]
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub source: String,
    pub message: &'static str,
    #[serde(flatten)]
    pub overview: DatasetOverview,
}

/// GET /api/v1/overview - Record, column and missing-value counts
#[cfg_attr(feature = "swagger", utoipa::path(get, path = "/api/v1/overview", responses((status = 200, body = OverviewResponse))))]
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OverviewResponse>>, ApiError> {
    let ds = dataset(&state).await?;
    Ok(Json(ApiResponse::success(OverviewResponse {
        source: ds.source().to_string(),
        message: "Data loaded successfully",
        overview: ds.overview(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/preview - First rows of the dataset
///
/// `limit` defaults to the configured preview size and is capped at
/// `dataset.max_preview_rows`.
#[cfg_attr(feature = "swagger", utoipa::path(get, path = "/api/v1/preview", params(("limit" = Option<usize>, Query)), responses((status = 200, body = PreviewTable))))]
pub async fn get_preview(
    State(state): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<PreviewQuery>, ApiError>,
) -> Result<Json<ApiResponse<PreviewTable>>, ApiError> {
    let ds = dataset(&state).await?;
    let limit = q
        .limit
        .unwrap_or(state.cfg.dataset.preview_rows)
        .min(state.cfg.dataset.max_preview_rows);
    Ok(Json(ApiResponse::success(ds.preview(limit)).with_count(ds.len())))
}

/// Values for the prediction form selectors.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub sub_divisions: Vec<String>,
    pub connection_types: Vec<String>,
    pub phases: Vec<String>,
    pub months: Vec<String>,
}

/// GET /api/v1/options
#[cfg_attr(feature = "swagger", utoipa::path(get, path = "/api/v1/options", responses((status = 200, body = FormOptions))))]
pub async fn get_options(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FormOptions>>, ApiError> {
    let ds = dataset(&state).await?;
    let options = ds.options().clone();
    Ok(Json(ApiResponse::success(FormOptions {
        sub_divisions: options.sub_divisions,
        connection_types: options.connection_types,
        phases: options.phases,
        months: Month::labels(),
    })))
}

/// GET /api/v1/model - Metadata of the loaded load model
#[cfg_attr(feature = "swagger", utoipa::path(get, path = "/api/v1/model", responses((status = 200, body = ModelMetadata))))]
pub async fn get_model(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ModelMetadata>>, ApiError> {
    let model = model(&state).await?;
    Ok(Json(ApiResponse::success(model.metadata().clone())))
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub report: PredictionReport,
    pub rendered: String,
}

/// POST /api/v1/predict - Future demand prediction
#[cfg_attr(feature = "swagger", utoipa::path(post, path = "/api/v1/predict", request_body = PredictionRequest, responses((status = 200, body = PredictionResponse), (status = 400))))]
pub async fn predict(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<PredictionRequest>, ApiError>,
) -> Result<Json<ApiResponse<PredictionResponse>>, ApiError> {
    let start = Instant::now();
    let ds = dataset(&state).await?;
    let model = model(&state).await?;

    let report = predict_future_demand(&req, ds.options(), model.as_ref())?;
    let rendered = report.render();

    Ok(Json(
        ApiResponse::success(PredictionResponse { report, rendered })
            .with_duration(start.elapsed().as_millis() as u64),
    ))
}
