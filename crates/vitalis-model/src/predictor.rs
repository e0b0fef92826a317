//! Process-wide predictor with single-flight initialization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{info, warn};
use vitalis_config::{LoadPolicy, ModelConfig};
use vitalis_core::{DiseaseCatalog, Measurements, PredictionResult, PredictorError, N_FEATURES};

use crate::forest::Classifier;
use crate::scaler::StandardScaler;
use crate::store::{ArtifactStore, ModelArtifact};
use crate::training;

/// How the in-memory model came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Loaded,
    Trained,
}

/// Immutable scaler and classifier pair shared by all predictions.
#[derive(Debug)]
pub struct LoadedModel {
    pub scaler: StandardScaler,
    pub model: ModelArtifact,
    pub source: ModelSource,
}

/// Owns the model state and runs single-vector inference.
///
/// The first successful [`Predictor::ensure_loaded`] fixes the state for the
/// lifetime of the predictor; later calls read it without locking.
pub struct Predictor {
    config: ModelConfig,
    store: ArtifactStore,
    catalog: DiseaseCatalog,
    state: OnceLock<Arc<LoadedModel>>,
    init_lock: Mutex<()>,
    training_runs: AtomicUsize,
}

impl Predictor {
    pub fn new(config: ModelConfig) -> Self {
        let store = ArtifactStore::new(config.artifact_dir.clone());
        Self {
            config,
            store,
            catalog: DiseaseCatalog,
            state: OnceLock::new(),
            init_lock: Mutex::new(()),
            training_runs: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    pub fn is_loaded(&self) -> bool {
        self.state.get().is_some()
    }

    /// Number of fallback training passes this predictor has run.
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    /// Loads the artifacts, or trains and persists a fallback model.
    ///
    /// Concurrent callers wait for a single pass and share its result. A
    /// failed pass leaves nothing cached, so the next call tries again.
    pub fn ensure_loaded(&self) -> Result<Arc<LoadedModel>, PredictorError> {
        if let Some(model) = self.state.get() {
            return Ok(model.clone());
        }

        // Guards no data, so a poisoned lock is still usable.
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = self.state.get() {
            return Ok(model.clone());
        }

        let model = Arc::new(self.load_or_train()?);
        Ok(self.state.get_or_init(|| model).clone())
    }

    fn load_or_train(&self) -> Result<LoadedModel, PredictorError> {
        if let Some((scaler, model)) = self.store.load()? {
            self.check_artifacts(&scaler, &model)?;
            info!(
                dir = %self.store.dir().display(),
                trees = model.forest.n_trees(),
                "Model loaded"
            );
            return Ok(LoadedModel { scaler, model, source: ModelSource::Loaded });
        }

        if self.config.load_policy == LoadPolicy::RequireArtifacts {
            return Err(PredictorError::storage(
                self.store.dir().display(),
                "no model artifacts found and training fallback is disabled",
            ));
        }

        warn!(dir = %self.store.dir().display(), "Model not found, training a new one");
        self.training_runs.fetch_add(1, Ordering::SeqCst);
        let (scaler, model) = training::train(&self.config.training, &self.catalog)?;
        self.store.save(&scaler, &model)?;

        Ok(LoadedModel { scaler, model, source: ModelSource::Trained })
    }

    fn check_artifacts(&self, scaler: &StandardScaler, model: &ModelArtifact) -> Result<(), PredictorError> {
        scaler
            .check(N_FEATURES)
            .map_err(|e| PredictorError::storage(self.store.scaler_path().display(), e))?;

        let model_path = self.store.model_path();
        if !self.catalog.matches(&model.labels) {
            return Err(PredictorError::storage(
                model_path.display(),
                format!(
                    "label encoding {:?} does not match catalog {:?}",
                    model.labels,
                    self.catalog.labels()
                ),
            ));
        }
        if model.n_features != N_FEATURES || model.forest.n_features() != N_FEATURES {
            return Err(PredictorError::storage(
                model_path.display(),
                format!("model was trained on {} features, expected {}", model.forest.n_features(), N_FEATURES),
            ));
        }
        if model.forest.n_classes() != self.catalog.len() {
            return Err(PredictorError::storage(
                model_path.display(),
                format!("model has {} classes, catalog has {}", model.forest.n_classes(), self.catalog.len()),
            ));
        }
        model
            .forest
            .check()
            .map_err(|e| PredictorError::storage(model_path.display(), e))
    }

    /// Predicts the disease category for one patient.
    pub fn predict(&self, measurements: &Measurements) -> Result<PredictionResult, PredictorError> {
        self.predict_raw(&measurements.to_features())
    }

    /// Predicts from an ordered feature slice of length [`N_FEATURES`].
    pub fn predict_raw(&self, features: &[f64]) -> Result<PredictionResult, PredictorError> {
        if features.len() != N_FEATURES {
            return Err(PredictorError::Inference(format!(
                "expected {} features, got {}",
                N_FEATURES,
                features.len()
            )));
        }

        let loaded = self.ensure_loaded()?;
        let scaled = loaded.scaler.transform(features)?;
        let probs = loaded.model.forest.predict_proba(&scaled)?;
        PredictionResult::from_probabilities(&self.catalog, &probs)
    }
}
