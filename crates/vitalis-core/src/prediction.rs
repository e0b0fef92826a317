//! Prediction results as returned to callers.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{DiseaseCatalog, PredictorError};

const SUM_TOLERANCE: f64 = 1e-9;

/// Per-label percentages, kept in catalog order.
///
/// Serializes as a JSON object whose keys follow the catalog order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassProbabilities(Vec<(String, f64)>);

impl ClassProbabilities {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, pct) in self.iter() {
            map.serialize_entry(label, &pct)?;
        }
        map.end()
    }
}

/// Outcome of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Most probable label.
    pub prediction: String,
    /// Probability of `prediction`, as a percentage.
    pub confidence: f64,
    /// Every label with its percentage.
    pub all_probabilities: ClassProbabilities,
}

impl PredictionResult {
    /// Builds a result from a class probability vector (fractions summing to 1).
    ///
    /// The predicted class is the argmax; ties go to the lowest index. A
    /// vector that is not a distribution is an inference error.
    pub fn from_probabilities(catalog: &DiseaseCatalog, probs: &[f64]) -> Result<Self, PredictorError> {
        if probs.len() != catalog.len() {
            return Err(PredictorError::Inference(format!(
                "classifier returned {} probabilities, catalog has {} labels",
                probs.len(),
                catalog.len()
            )));
        }
        if let Some(bad) = probs.iter().find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p)) {
            return Err(PredictorError::Inference(format!("probability {} outside [0, 1]", bad)));
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(PredictorError::Inference(format!("probabilities sum to {}", total)));
        }

        let (best, best_p) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        let all_probabilities = ClassProbabilities(
            catalog
                .labels()
                .iter()
                .zip(probs)
                .map(|(label, p)| (label.to_string(), p * 100.0))
                .collect(),
        );

        let prediction = catalog
            .label(best)
            .ok_or_else(|| PredictorError::Inference(format!("no label for class {}", best)))?;

        Ok(Self {
            prediction: prediction.to_string(),
            confidence: best_p * 100.0,
            all_probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_and_percentages() {
        let result =
            PredictionResult::from_probabilities(&DiseaseCatalog, &[0.1, 0.2, 0.4, 0.2, 0.1]).unwrap();
        assert_eq!(result.prediction, "Diabet");
        assert!((result.confidence - 40.0).abs() < 1e-9);
        assert_eq!(result.all_probabilities.len(), 5);
        let (_, asthma) = result.all_probabilities.iter().find(|(k, _)| *k == "Astma").unwrap();
        assert!((asthma - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let result =
            PredictionResult::from_probabilities(&DiseaseCatalog, &[0.1, 0.3, 0.3, 0.2, 0.1]).unwrap();
        assert_eq!(result.prediction, "Yurak kasalligi");
    }

    #[test]
    fn test_length_mismatch_is_inference_error() {
        let err = PredictionResult::from_probabilities(&DiseaseCatalog, &[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, PredictorError::Inference(_)));
    }

    #[test]
    fn test_rejects_vectors_that_are_not_distributions() {
        let inflated = [5.0, -1.0, -1.0, -1.0, -1.0];
        let negative = [1.2, -0.2, 0.0, 0.0, 0.0];
        let short_sum = [0.1, 0.1, 0.1, 0.1, 0.1];
        let nan = [f64::NAN, 0.25, 0.25, 0.25, 0.25];
        for probs in [inflated, negative, short_sum, nan] {
            let err = PredictionResult::from_probabilities(&DiseaseCatalog, &probs).unwrap_err();
            assert!(matches!(err, PredictorError::Inference(_)), "{:?}", probs);
        }
    }

    #[test]
    fn test_healthy_label_is_exact() {
        let result =
            PredictionResult::from_probabilities(&DiseaseCatalog, &[0.6, 0.1, 0.1, 0.1, 0.1]).unwrap();
        assert_eq!(result.prediction, "Sog'lom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["prediction"], "Sog'lom");
        assert!((json["all_probabilities"]["Sog'lom"].as_f64().unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_in_catalog_order() {
        let result =
            PredictionResult::from_probabilities(&DiseaseCatalog, &[0.2, 0.2, 0.2, 0.2, 0.2]).unwrap();
        let json = serde_json::to_string(&result.all_probabilities).unwrap();
        let positions: Vec<usize> = DiseaseCatalog
            .labels()
            .iter()
            .map(|l| json.find(l).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
