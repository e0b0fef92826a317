//! Per-feature mean/std standardization.

use serde::{Deserialize, Serialize};
use vitalis_core::PredictorError;

/// Standard scaler (per-column mean and population std).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    /// Std below this is treated as zero; the feature is then only centred.
    const MIN_STD: f64 = 1e-12;

    /// Fits a scaler on row-major samples.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, PredictorError> {
        let Some(first) = rows.first() else {
            return Err(PredictorError::Training("cannot fit scaler on an empty set".into()));
        };
        let ncols = first.len();
        if ncols == 0 || rows.iter().any(|r| r.len() != ncols) {
            return Err(PredictorError::Training("scaler input rows must share a non-zero width".into()));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; ncols];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; ncols];
        for row in rows {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *acc += d * d;
            }
        }
        let std = var
            .into_iter()
            .map(|v| {
                let s = (v / n).sqrt();
                if s < Self::MIN_STD { 1.0 } else { s }
            })
            .collect();

        Ok(Self { mean, std })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardizes a single row as `(x - mean) / std`.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictorError> {
        if row.len() != self.n_features() {
            return Err(PredictorError::Inference(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PredictorError> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    /// Checks parameters read back from an artifact.
    pub fn check(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features || self.std.len() != n_features {
            return Err(format!(
                "expected {} mean/std pairs, found {}/{}",
                n_features,
                self.mean.len(),
                self.std.len()
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("non-finite mean".into());
        }
        if self.std.iter().any(|s| !s.is_finite() || *s < Self::MIN_STD) {
            return Err("std must be finite and positive".into());
        }
        Ok(())
    }
}
