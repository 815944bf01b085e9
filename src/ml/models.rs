//! Load Model Estimators
//!
//! Estimators operate on already-encoded feature vectors.

use super::{FeatureVector, ModelMetadata, ModelType, Prediction};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Trait for load models
pub trait LoadModel: Send + Sync {
    /// Predict a load (kW) from features
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

/// Simple Linear Regression Model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegressionModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, metadata: ModelMetadata) -> Self {
        Self {
            metadata,
            coefficients,
            intercept,
        }
    }
}

impl LoadModel for LinearRegressionModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if features.len() != self.coefficients.len() {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                self.coefficients.len(),
                features.len()
            );
        }

        let prediction: f64 = features
            .features
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept;

        Ok(Prediction::new(prediction))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Mean observed load for one category code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryMean {
    pub code: f64,
    pub load_kw: f64,
}

/// Predicts the mean load seen per category code during fitting, the
/// behaviour of a tree regressor over a single categorical feature.
/// Codes never seen during fitting get `fallback_kw`, the overall mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryMeanModel {
    pub metadata: ModelMetadata,
    pub means: Vec<CategoryMean>,
    pub fallback_kw: f64,
}

impl CategoryMeanModel {
    const CODE_EPSILON: f64 = 1e-9;

    /// Fit from `(code, load_kw)` observations.
    pub fn fit(observations: &[(f64, f64)], metadata: ModelMetadata) -> Result<Self> {
        if observations.is_empty() {
            anyhow::bail!("Cannot fit on empty observations");
        }

        let mut groups: Vec<(f64, f64, usize)> = Vec::new();
        for &(code, load) in observations {
            match groups
                .iter_mut()
                .find(|(c, _, _)| (c - code).abs() < Self::CODE_EPSILON)
            {
                Some((_, sum, n)) => {
                    *sum += load;
                    *n += 1;
                }
                None => groups.push((code, load, 1)),
            }
        }

        let total: f64 = observations.iter().map(|(_, load)| load).sum();
        let means = groups
            .into_iter()
            .map(|(code, sum, n)| CategoryMean {
                code,
                load_kw: sum / n as f64,
            })
            .collect();

        Ok(Self {
            metadata: ModelMetadata {
                training_samples: observations.len(),
                ..metadata
            },
            means,
            fallback_kw: total / observations.len() as f64,
        })
    }
}

impl LoadModel for CategoryMeanModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let [code] = features.features.as_slice() else {
            anyhow::bail!("Feature count mismatch: expected 1, got {}", features.len());
        };

        let value = self
            .means
            .iter()
            .find(|m| (m.code - code).abs() < Self::CODE_EPSILON)
            .map(|m| m.load_kw)
            .unwrap_or(self.fallback_kw);

        Ok(Prediction::new(value))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// The estimators a model artifact may carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    LinearRegression(LinearRegressionModel),
    CategoryMean(CategoryMeanModel),
}

impl LoadModel for Estimator {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        match self {
            Estimator::LinearRegression(m) => m.predict(features),
            Estimator::CategoryMean(m) => m.predict(features),
        }
    }

    fn metadata(&self) -> &ModelMetadata {
        match self {
            Estimator::LinearRegression(m) => m.metadata(),
            Estimator::CategoryMean(m) => m.metadata(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn metadata(model_type: ModelType) -> ModelMetadata {
        ModelMetadata {
            model_id: "test".to_string(),
            model_type,
            version: "0.1.0".to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: 100,
            validation_metrics: None,
            feature_names: vec!["APPPHASE".to_string()],
        }
    }

    #[test]
    fn test_linear_regression_predict() {
        let model = LinearRegressionModel::new(
            vec![2.0, 3.0, 1.0],
            5.0,
            metadata(ModelType::LinearRegression),
        );

        let features = FeatureVector::new(
            vec![1.0, 2.0, 3.0],
            vec!["f1".to_string(), "f2".to_string(), "f3".to_string()],
        )
        .unwrap();

        let prediction = model.predict(&features).unwrap();
        // 2*1 + 3*2 + 1*3 + 5 = 16
        assert_eq!(prediction.value, 16.0);
    }

    #[test]
    fn test_linear_regression_feature_mismatch() {
        let model = LinearRegressionModel::new(vec![2.0], 0.0, metadata(ModelType::LinearRegression));
        let features = FeatureVector::new(vec![1.0, 2.0], vec!["a".into(), "b".into()]).unwrap();
        assert!(model.predict(&features).is_err());
    }

    #[test]
    fn test_category_mean_fit_and_predict() {
        let observations = [(1.0, 2.0), (1.0, 4.0), (3.0, 30.0), (3.0, 50.0)];
        let model = CategoryMeanModel::fit(&observations, metadata(ModelType::CategoryMean)).unwrap();

        assert_eq!(model.metadata.training_samples, 4);
        assert_eq!(model.predict(&FeatureVector::scalar("APPPHASE", 1.0)).unwrap().value, 3.0);
        assert_eq!(model.predict(&FeatureVector::scalar("APPPHASE", 3.0)).unwrap().value, 40.0);
        // unseen code falls back to the overall mean
        assert_eq!(model.predict(&FeatureVector::scalar("APPPHASE", 2.0)).unwrap().value, 21.5);
    }

    #[test]
    fn test_category_mean_requires_one_feature() {
        let model = CategoryMeanModel::fit(&[(1.0, 1.0)], metadata(ModelType::CategoryMean)).unwrap();
        let features = FeatureVector::new(vec![1.0, 2.0], vec!["a".into(), "b".into()]).unwrap();
        assert!(model.predict(&features).is_err());
        assert!(CategoryMeanModel::fit(&[], metadata(ModelType::CategoryMean)).is_err());
    }

    #[test]
    fn test_estimator_dispatch() {
        let est = Estimator::LinearRegression(LinearRegressionModel::new(
            vec![10.0],
            1.0,
            metadata(ModelType::LinearRegression),
        ));
        assert_eq!(est.predict(&FeatureVector::scalar("APPPHASE", 3.0)).unwrap().value, 31.0);
        assert_eq!(est.model_type(), ModelType::LinearRegression);
    }
}
