//! Load Prediction Model
//!
//! The load model is a pre-trained artifact deserialized once at startup. It
//! takes a one-dimensional feature vector (the encoded service phase) and
//! returns a predicted connected load in kW.
//!
//! # Architecture
//! - [`models`]: estimators behind the [`models::LoadModel`] trait
//! - [`encoder`]: categorical label to numeric code mapping
//! - [`artifact`]: on-disk format, encoder + estimator, JSON or bincode

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod artifact;
pub mod encoder;
pub mod models;

pub use artifact::{LoadPredictor, ModelArtifact};
pub use encoder::CategoricalEncoder;
pub use models::{CategoryMeanModel, Estimator, LinearRegressionModel, LoadModel};

/// ML Model Type
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelType {
    LinearRegression,
    CategoryMean,
}

/// ML Model Metadata
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub training_samples: usize,
    #[serde(default)]
    pub validation_metrics: Option<ValidationMetrics>,
    pub feature_names: Vec<String>,
}

/// Validation Metrics
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    pub mae: f64,  // Mean Absolute Error
    pub rmse: f64, // Root Mean Square Error
    pub r2: f64,   // R-squared
}

/// Feature Vector for ML models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.len() != feature_names.len() {
            anyhow::bail!(
                "Feature count mismatch: {} features, {} names",
                features.len(),
                feature_names.len()
            );
        }
        Ok(Self {
            features,
            feature_names,
        })
    }

    /// A single named feature.
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            features: vec![value],
            feature_names: vec![name.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// ML Prediction Result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}
