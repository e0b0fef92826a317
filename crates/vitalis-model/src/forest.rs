//! Bagged ensemble of linfa CART trees.
//!
//! Each tree is fitted with Gini splits on a bootstrap sample. Class
//! probabilities are the fraction of trees voting for each class, which for
//! fully grown (pure-leaf) trees equals the mean of the leaf distributions.

use std::fmt;

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vitalis_core::PredictorError;

/// Multi-class probabilistic classifier over dense rows.
pub trait Classifier {
    /// Fit on row-major samples `x` with class indices `y`.
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<(), PredictorError>;

    /// Class probabilities for one row; non-negative, summing to 1.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictorError>;

    fn n_classes(&self) -> usize;

    /// Human readable name for logs.
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Tree growth limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

/// Random forest (bagging) over [`DecisionTree`]s.
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree<f64, usize>>,
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("params", &self.params)
            .field("n_classes", &self.n_classes)
            .field("n_features", &self.n_features)
            .field("trees", &self.trees.len())
            .finish()
    }
}

impl RandomForest {
    pub fn new(params: ForestParams, n_classes: usize) -> Self {
        Self {
            params,
            n_classes,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Structural checks for a forest decoded from an artifact.
    ///
    /// Every node must vote for a known class and every split must use an
    /// existing feature with a finite threshold.
    pub fn check(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            for node in tree.iter_nodes() {
                if let Some(class) = node.prediction() {
                    if class >= self.n_classes {
                        return Err(format!("tree {} votes for unknown class {}", t, class));
                    }
                }
                if !node.is_leaf() {
                    let (feature, threshold, _) = node.split();
                    if feature >= self.n_features || !threshold.is_finite() {
                        return Err(format!("tree {} has an invalid split", t));
                    }
                }
            }
        }
        Ok(())
    }

    fn vote(&self, x: &Array2<f64>) -> Result<Vec<f64>, PredictorError> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let labels: Array1<usize> = tree.predict(x);
            let class = labels[0];
            let slot = votes.get_mut(class).ok_or_else(|| {
                PredictorError::Inference(format!("tree voted for unknown class {}", class))
            })?;
            *slot += 1;
        }
        let n_trees = self.trees.len() as f64;
        Ok(votes.into_iter().map(|v| v as f64 / n_trees).collect())
    }
}

fn to_array(x: &[Vec<f64>], n_features: usize) -> Result<Array2<f64>, PredictorError> {
    let flat: Vec<f64> = x.iter().flatten().copied().collect();
    Array2::from_shape_vec((x.len(), n_features), flat)
        .map_err(|e| PredictorError::Training(format!("bad training matrix: {}", e)))
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<(), PredictorError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(PredictorError::Training(format!(
                "need matching non-empty samples and labels, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|r| r.len() != n_features) {
            return Err(PredictorError::Training("rows must share a non-zero width".into()));
        }
        if let Some(bad) = y.iter().find(|&&c| c >= self.n_classes) {
            return Err(PredictorError::Training(format!(
                "label {} outside 0..{}",
                bad, self.n_classes
            )));
        }
        if self.params.n_estimators == 0 {
            return Err(PredictorError::Training("n_estimators must be positive".into()));
        }

        let records = to_array(x, n_features)?;
        let targets = Array1::from_vec(y.to_vec());
        let n = x.len();

        let tree_params = DecisionTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.params.max_depth)
            .min_weight_split(self.params.min_samples_split.max(2) as f32)
            .min_weight_leaf(1.0);

        let trees = (0..self.params.n_estimators)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let bag = Dataset::new(
                    records.select(Axis(0), &sample),
                    targets.select(Axis(0), &sample),
                );
                tree_params
                    .fit(&bag)
                    .map_err(|e| PredictorError::Training(format!("tree {}: {}", t, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.n_features = n_features;
        self.trees = trees;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictorError> {
        if self.trees.is_empty() {
            return Err(PredictorError::Inference("forest is not fitted".into()));
        }
        if row.len() != self.n_features {
            return Err(PredictorError::Inference(format!(
                "forest expects {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| PredictorError::Inference(e.to_string()))?;
        self.vote(&x)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_estimators: usize) -> ForestParams {
        ForestParams {
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            seed: 7,
        }
    }

    /// Two well separated blobs, class 0 left of zero and class 1 right of it.
    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let offset = i as f64 * 0.1;
            x.push(vec![-5.0 - offset, offset]);
            y.push(0);
            x.push(vec![5.0 + offset, offset]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_learns_separable_data() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(params(15), 2);
        forest.fit(&x, &y).unwrap();

        let left = forest.predict_proba(&[-6.0, 1.0]).unwrap();
        let right = forest.predict_proba(&[6.0, 1.0]).unwrap();
        assert!(left[0] > 0.9);
        assert!(right[1] > 0.9);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let x: Vec<Vec<f64>> = (0..60).map(|i| vec![(i % 7) as f64, (i % 11) as f64, i as f64]).collect();
        let y: Vec<usize> = (0..60).map(|i| i % 3).collect();
        let mut forest = RandomForest::new(params(10), 3);
        forest.fit(&x, &y).unwrap();

        for row in &x {
            let p = forest.predict_proba(row).unwrap();
            assert_eq!(p.len(), 3);
            assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let mut a = RandomForest::new(params(5), 2);
        let mut b = RandomForest::new(params(5), 2);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_training_input() {
        let mut forest = RandomForest::new(params(3), 2);
        assert!(matches!(forest.fit(&[], &[]), Err(PredictorError::Training(_))));
        assert!(matches!(
            forest.fit(&[vec![1.0], vec![2.0]], &[0, 2]),
            Err(PredictorError::Training(_))
        ));
    }

    #[test]
    fn test_unfitted_and_wrong_width() {
        let forest = RandomForest::new(params(3), 2);
        assert!(matches!(forest.predict_proba(&[1.0]), Err(PredictorError::Inference(_))));

        let (x, y) = separable();
        let mut forest = RandomForest::new(params(3), 2);
        forest.fit(&x, &y).unwrap();
        assert!(matches!(forest.predict_proba(&[1.0]), Err(PredictorError::Inference(_))));
    }

    #[test]
    fn test_check_accepts_fitted_and_rejects_empty() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(params(2), 2);
        forest.fit(&x, &y).unwrap();
        assert!(forest.check().is_ok());

        assert!(RandomForest::new(params(2), 2).check().is_err());
    }

    #[test]
    fn test_check_rejects_fewer_classes_than_votes() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(params(3), 2);
        forest.fit(&x, &y).unwrap();

        let mut json = serde_json::to_value(&forest).unwrap();
        json["n_classes"] = serde_json::json!(1);
        let shrunk: RandomForest = serde_json::from_value(json).unwrap();
        assert!(shrunk.check().unwrap_err().contains("unknown class"));
    }
}
