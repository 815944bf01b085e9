use utoipa::OpenApi;

use crate::api::v1::{FormOptions, OverviewResponse, PredictionResponse};
use crate::dataset::{DatasetOverview, PreviewTable};
use crate::demand::{DemandZone, Month, PredictionReport, PredictionRequest};
use crate::ml::{ModelMetadata, ModelType, ValidationMetrics};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::v1::get_overview,
        crate::api::v1::get_preview,
        crate::api::v1::get_options,
        crate::api::v1::get_model,
        crate::api::v1::predict,
        crate::api::v1::healthz,
    ),
    components(
        schemas(
            OverviewResponse, DatasetOverview, PreviewTable, FormOptions,
            PredictionRequest, PredictionReport, PredictionResponse,
            DemandZone, Month, ModelMetadata, ModelType, ValidationMetrics
        )
    ),
    tags((name = "nsc-eesp", description = "NSC - EESP analysis and prediction API v1"))
)]
pub struct ApiDoc;
