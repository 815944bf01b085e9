//! Serialized load model artifact.
//!
//! Stored as JSON (`.json`) or bincode (`.bin`, `.bincode`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::{
    models::{Estimator, LoadModel},
    CategoricalEncoder, FeatureVector, ModelMetadata, Prediction,
};

/// The call the dashboard makes against the pre-trained model.
pub trait LoadPredictor: Send + Sync {
    /// Predict the connected load (kW) for a service phase.
    fn predict_phase_load(&self, phase: &str) -> Result<Prediction>;

    fn metadata(&self) -> &ModelMetadata;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("bin") | Some("bincode") => Ok(Self::Bincode),
            other => anyhow::bail!(
                "unsupported model artifact extension {:?} for {}",
                other,
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    /// Name of the single input feature, e.g. `APPPHASE`.
    pub feature: String,
    #[serde(default)]
    pub encoder: CategoricalEncoder,
    pub estimator: Estimator,
}

impl ModelArtifact {
    pub fn new(feature: impl Into<String>, encoder: CategoricalEncoder, estimator: Estimator) -> Self {
        Self {
            feature: feature.into(),
            encoder,
            estimator,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ArtifactFormat::from_path(path)?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;

        let artifact: Self = match format {
            ArtifactFormat::Json => serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed JSON model artifact {}", path.display()))?,
            ArtifactFormat::Bincode => bincode::deserialize(&bytes)
                .map_err(|e| anyhow::anyhow!("malformed bincode model artifact {}: {}", path.display(), e))?,
        };

        let meta = artifact.estimator.metadata();
        info!(
            path = %path.display(),
            model_id = %meta.model_id,
            model_type = ?meta.model_type,
            version = %meta.version,
            "model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = match ArtifactFormat::from_path(path)? {
            ArtifactFormat::Json => serde_json::to_vec_pretty(self)?,
            ArtifactFormat::Bincode => bincode::serialize(self)
                .map_err(|e| anyhow::anyhow!("Failed to serialize model: {}", e))?,
        };
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write model artifact {}", path.display()))
    }
}

impl LoadPredictor for ModelArtifact {
    fn predict_phase_load(&self, phase: &str) -> Result<Prediction> {
        let code = self.encoder.encode(phase)?;
        let prediction = self
            .estimator
            .predict(&FeatureVector::scalar(self.feature.clone(), code))?;

        if !prediction.value.is_finite() {
            anyhow::bail!("model produced a non-finite load for phase '{}'", phase);
        }
        debug!(phase, code, load_kw = prediction.value, "phase load predicted");
        Ok(prediction)
    }

    fn metadata(&self) -> &ModelMetadata {
        self.estimator.metadata()
    }
}
