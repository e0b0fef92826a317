//! Synthetic fallback training.
//!
//! The generated set has no clinical meaning: features are drawn from
//! per-feature normal distributions and labels are uniform over the catalog.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use tracing::info;
use vitalis_config::TrainingConfig;
use vitalis_core::{DiseaseCatalog, Feature, PredictorError, N_FEATURES};

use crate::forest::{Classifier, ForestParams, RandomForest};
use crate::scaler::StandardScaler;
use crate::store::ModelArtifact;

/// Generated samples and class indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<usize>,
}

/// Mean and std used to synthesize each feature.
fn distribution(feature: Feature) -> (f64, f64) {
    match feature {
        Feature::Age => (50.0, 15.0),
        Feature::BloodPressure => (120.0, 20.0),
        Feature::Cholesterol => (180.0, 40.0),
        Feature::Glucose => (100.0, 30.0),
        Feature::Bmi => (25.0, 5.0),
        Feature::HeartRate => (75.0, 15.0),
    }
}

/// Draws `n_samples` rows, then one label per row, from a seeded RNG.
pub fn synthesize(n_samples: usize, n_classes: usize, seed: u64) -> TrainingSet {
    let mut rng = StdRng::seed_from_u64(seed);

    let x: Vec<Vec<f64>> = (0..n_samples)
        .map(|_| {
            Feature::ALL
                .iter()
                .map(|&f| {
                    let (mean, std) = distribution(f);
                    let z: f64 = StandardNormal.sample(&mut rng);
                    z * std + mean
                })
                .collect()
        })
        .collect();
    let y: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_classes)).collect();

    TrainingSet { x, y }
}

/// Fits a scaler and a forest on a freshly synthesized set.
pub fn train(
    config: &TrainingConfig,
    catalog: &DiseaseCatalog,
) -> Result<(StandardScaler, ModelArtifact), PredictorError> {
    if config.n_samples == 0 {
        return Err(PredictorError::Training("n_samples must be positive".into()));
    }

    let set = synthesize(config.n_samples, catalog.len(), config.seed);
    let scaler = StandardScaler::fit(&set.x)?;
    let scaled = scaler.transform_all(&set.x)?;

    let mut forest = RandomForest::new(
        ForestParams {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            seed: config.seed,
        },
        catalog.len(),
    );
    forest.fit(&scaled, &set.y)?;

    info!(
        classifier = forest.name(),
        samples = config.n_samples,
        trees = forest.n_trees(),
        "Model trained"
    );

    Ok((
        scaler,
        ModelArtifact {
            labels: catalog.encoding(),
            n_features: N_FEATURES,
            forest,
        },
    ))
}
