use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::ml::{LoadPredictor, ModelArtifact};

/// Process-wide read-only handles to the dataset and the load model.
///
/// Each handle is initialized at most once; concurrent first callers block on
/// the same initialization. A failed load leaves the cell empty so the next
/// call tries again.
pub struct Resources {
    cfg: Config,
    dataset: OnceCell<Arc<Dataset>>,
    model: OnceCell<Arc<dyn LoadPredictor>>,
}

impl Resources {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            dataset: OnceCell::new(),
            model: OnceCell::new(),
        }
    }

    /// Handles that are already loaded, e.g. built in memory.
    pub fn preloaded(cfg: Config, dataset: Dataset, model: Arc<dyn LoadPredictor>) -> Self {
        Self {
            cfg,
            dataset: OnceCell::with_value(Arc::new(dataset)),
            model: OnceCell::with_value(model),
        }
    }

    pub fn dataset(&self) -> Result<Arc<Dataset>> {
        self.dataset
            .get_or_try_init(|| {
                let opts = self.cfg.dataset.load_options()?;
                let dataset = Dataset::load(&self.cfg.dataset.path, &opts).with_context(|| {
                    format!("failed to load dataset {}", self.cfg.dataset.path.display())
                })?;
                Ok(Arc::new(dataset))
            })
            .map(Arc::clone)
    }

    pub fn model(&self) -> Result<Arc<dyn LoadPredictor>> {
        self.model
            .get_or_try_init(|| {
                let artifact = ModelArtifact::load(&self.cfg.model.path)?;
                Ok(Arc::new(artifact) as Arc<dyn LoadPredictor>)
            })
            .map(Arc::clone)
    }

    pub fn is_dataset_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Load both handles off the async runtime.
    pub async fn warm_up(self: &Arc<Self>) -> Result<()> {
        let resources = Arc::clone(self);
        tokio::task::spawn_blocking(move || -> Result<()> {
            let dataset = resources.dataset()?;
            let model = resources.model()?;
            info!(
                rows = dataset.len(),
                model_id = %model.metadata().model_id,
                "resources ready"
            );
            Ok(())
        })
        .await?
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub resources: Arc<Resources>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let resources = Arc::new(Resources::new(cfg.clone()));
        Self { cfg, resources }
    }

    pub fn with_resources(cfg: Config, resources: Resources) -> Self {
        Self {
            cfg,
            resources: Arc::new(resources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetConfig, ModelConfig};
    use crate::dataset::LoadOptions;
    use crate::ml::models::tests::metadata;
    use crate::ml::{CategoricalEncoder, CategoryMeanModel, Estimator, ModelType};
    use tempfile::tempdir;

    fn artifact() -> ModelArtifact {
        let model = CategoryMeanModel::fit(&[(1.0, 3.0), (3.0, 9.0)], metadata(ModelType::CategoryMean)).unwrap();
        ModelArtifact::new("APPPHASE", CategoricalEncoder::default(), Estimator::CategoryMean(model))
    }

    #[test]
    fn test_preloaded_resources() {
        let dataset = crate::dataset::tests::sample();
        let res = Resources::preloaded(Config::default(), dataset, Arc::new(artifact()));
        assert!(res.is_dataset_loaded());
        assert!(res.is_model_loaded());

        let first = res.dataset().unwrap();
        let second = res.dataset().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lazy_load_from_files() {
        let dir = tempdir().unwrap();
        let data_path = dir.path().join("nsc_data.csv");
        let model_path = dir.path().join("load_model.json");
        std::fs::write(&data_path, crate::dataset::tests::SAMPLE).unwrap();
        artifact().save(&model_path).unwrap();

        let cfg = Config {
            dataset: DatasetConfig { path: data_path.clone(), ..Default::default() },
            model: ModelConfig { path: model_path.clone() },
            ..Default::default()
        };
        let res = Resources::new(cfg);
        assert!(!res.is_dataset_loaded());

        let ds = res.dataset().unwrap();
        assert_eq!(ds.len(), 5);
        assert!(res.is_dataset_loaded());
        assert_eq!(res.model().unwrap().predict_phase_load("3").unwrap().value, 9.0);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nsc_data.csv");
        let cfg = Config {
            dataset: DatasetConfig { path: path.clone(), ..Default::default() },
            ..Default::default()
        };
        let res = Resources::new(cfg);
        assert!(res.dataset().is_err());
        assert!(!res.is_dataset_loaded());

        std::fs::write(&path, crate::dataset::tests::SAMPLE).unwrap();
        assert!(res.dataset().is_ok());
    }

    #[tokio::test]
    async fn test_warm_up_fails_without_model() {
        let ds = Dataset::from_reader(
            crate::dataset::tests::SAMPLE.as_bytes(),
            "sample",
            &LoadOptions::default(),
        )
        .unwrap();
        let cfg = Config {
            model: ModelConfig { path: "/nonexistent/load_model.json".into() },
            ..Default::default()
        };
        let res = Arc::new(Resources {
            cfg: cfg.clone(),
            dataset: OnceCell::with_value(Arc::new(ds)),
            model: OnceCell::new(),
        });
        assert!(res.warm_up().await.is_err());
    }
}
