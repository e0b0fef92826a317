//! JSON artifact storage for the scaler and the classifier.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vitalis_core::PredictorError;

use crate::forest::RandomForest;
use crate::scaler::StandardScaler;

pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";

/// Serialized classifier together with its class encoding.
///
/// `labels[i]` is the label the forest means by class index `i`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub labels: Vec<String>,
    pub n_features: usize,
    pub forest: RandomForest,
}

/// Artifact pair in a directory on local storage.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Reads both artifacts.
    ///
    /// Returns `Ok(None)` only when neither file exists. A lone file, an
    /// unreadable file or undecodable JSON is a storage error. Leftovers of an
    /// interrupted [`ArtifactStore::save`] are settled first.
    pub fn load(&self) -> Result<Option<(StandardScaler, ModelArtifact)>, PredictorError> {
        let scaler_path = self.scaler_path();
        let model_path = self.model_path();
        self.recover(&scaler_path, &model_path)?;

        match (exists(&scaler_path)?, exists(&model_path)?) {
            (false, false) => Ok(None),
            (true, false) => Err(PredictorError::storage(model_path.display(), "missing while scaler exists")),
            (false, true) => Err(PredictorError::storage(scaler_path.display(), "missing while model exists")),
            (true, true) => {
                let scaler = read_json(&scaler_path)?;
                let model = read_json(&model_path)?;
                info!("Artifacts read from {}", self.dir.display());
                Ok(Some((scaler, model)))
            }
        }
    }

    /// Writes both artifacts as a pair.
    ///
    /// Both temporary files are written before either is renamed, and the
    /// scaler is always renamed first. A staged model without a staged scaler
    /// therefore means the pair was complete when the process stopped.
    pub fn save(&self, scaler: &StandardScaler, model: &ModelArtifact) -> Result<(), PredictorError> {
        fs::create_dir_all(&self.dir).map_err(|e| PredictorError::storage(self.dir.display(), e))?;
        let scaler_path = self.scaler_path();
        let model_path = self.model_path();

        let scaler_tmp = stage(&scaler_path, scaler)?;
        let model_tmp = stage(&model_path, model)?;
        commit(&scaler_tmp, &scaler_path)?;
        commit(&model_tmp, &model_path)?;

        info!("Artifacts written to {}", self.dir.display());
        Ok(())
    }

    fn recover(&self, scaler_path: &Path, model_path: &Path) -> Result<(), PredictorError> {
        let scaler_tmp = tmp_path(scaler_path);
        let model_tmp = tmp_path(model_path);

        if exists(&scaler_tmp)? {
            // Nothing was renamed yet, the previous pair is intact.
            warn!(dir = %self.dir.display(), "Discarding staged artifacts from an interrupted save");
            discard(&scaler_tmp)?;
            if exists(&model_tmp)? {
                discard(&model_tmp)?;
            }
        } else if exists(&model_tmp)? {
            warn!(dir = %self.dir.display(), "Completing an interrupted artifact save");
            commit(&model_tmp, model_path)?;
        }
        Ok(())
    }
}

fn exists(path: &Path) -> Result<bool, PredictorError> {
    path.try_exists().map_err(|e| PredictorError::storage(path.display(), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictorError> {
    let content = fs::read_to_string(path).map_err(|e| PredictorError::storage(path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| PredictorError::storage(path.display(), e))
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Writes `value` next to `path` and flushes it to disk.
fn stage<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, PredictorError> {
    let tmp = tmp_path(path);
    let json = serde_json::to_vec(value).map_err(|e| PredictorError::storage(path.display(), e))?;
    let mut file = fs::File::create(&tmp).map_err(|e| PredictorError::storage(tmp.display(), e))?;
    file.write_all(&json)
        .and_then(|_| file.sync_all())
        .map_err(|e| PredictorError::storage(tmp.display(), e))?;
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<(), PredictorError> {
    fs::rename(tmp, path).map_err(|e| PredictorError::storage(path.display(), e))
}

fn discard(tmp: &Path) -> Result<(), PredictorError> {
    fs::remove_file(tmp).map_err(|e| PredictorError::storage(tmp.display(), e))
}
