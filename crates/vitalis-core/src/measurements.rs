//! Patient measurements, feature order and range validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Number of features the model consumes.
pub const N_FEATURES: usize = 6;

/// One model input column. Declaration order is the feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Age,
    BloodPressure,
    Cholesterol,
    Glucose,
    Bmi,
    HeartRate,
}

impl Feature {
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::Age,
        Feature::BloodPressure,
        Feature::Cholesterol,
        Feature::Glucose,
        Feature::Bmi,
        Feature::HeartRate,
    ];

    /// JSON field name of this feature.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::BloodPressure => "blood_pressure",
            Feature::Cholesterol => "cholesterol",
            Feature::Glucose => "glucose",
            Feature::Bmi => "bmi",
            Feature::HeartRate => "heart_rate",
        }
    }

    /// Closed range `(min, max)` accepted for this feature.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Feature::Age => (0.0, 120.0),
            Feature::BloodPressure => (60.0, 200.0),
            Feature::Cholesterol => (100.0, 400.0),
            Feature::Glucose => (50.0, 300.0),
            Feature::Bmi => (10.0, 50.0),
            Feature::HeartRate => (40.0, 200.0),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six vital signs of one patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Age in years.
    pub age: i64,
    /// Systolic blood pressure (mmHg).
    pub blood_pressure: f64,
    /// Total cholesterol (mg/dL).
    pub cholesterol: f64,
    /// Blood glucose (mg/dL).
    pub glucose: f64,
    /// Body-mass index.
    pub bmi: f64,
    /// Heart rate (bpm).
    pub heart_rate: f64,
}

impl Measurements {
    /// Value of a single feature as `f64`.
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Age => self.age as f64,
            Feature::BloodPressure => self.blood_pressure,
            Feature::Cholesterol => self.cholesterol,
            Feature::Glucose => self.glucose,
            Feature::Bmi => self.bmi,
            Feature::HeartRate => self.heart_rate,
        }
    }

    /// Ordered feature vector in [`Feature::ALL`] order.
    pub fn to_features(&self) -> [f64; N_FEATURES] {
        Feature::ALL.map(|f| self.get(f))
    }
}

/// A single field outside its declared range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeViolation {
    pub field: Feature,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} (expected {}..={})",
            self.field, self.value, self.min, self.max
        )
    }
}

/// Checks every field against its closed range.
///
/// Non-finite values are always rejected. The error lists all violations,
/// not only the first one found.
pub fn validate(m: &Measurements) -> Result<(), ValidationError> {
    let violations: Vec<RangeViolation> = Feature::ALL
        .iter()
        .filter_map(|&field| {
            let value = m.get(field);
            let (min, max) = field.range();
            let in_range = value.is_finite() && value >= min && value <= max;
            (!in_range).then_some(RangeViolation { field, value, min, max })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> Measurements {
        Measurements {
            age: 45,
            blood_pressure: 130.0,
            cholesterol: 200.0,
            glucose: 110.0,
            bmi: 28.5,
            heart_rate: 75.0,
        }
    }

    #[test]
    fn test_valid_measurements_pass() {
        assert!(validate(&healthy()).is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let low = Measurements {
            age: 0,
            blood_pressure: 60.0,
            cholesterol: 100.0,
            glucose: 50.0,
            bmi: 10.0,
            heart_rate: 40.0,
        };
        let high = Measurements {
            age: 120,
            blood_pressure: 200.0,
            cholesterol: 400.0,
            glucose: 300.0,
            bmi: 50.0,
            heart_rate: 200.0,
        };
        assert!(validate(&low).is_ok());
        assert!(validate(&high).is_ok());
    }

    #[test]
    fn test_single_violation() {
        let m = Measurements { age: 200, ..healthy() };
        let err = validate(&m).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, Feature::Age);
        assert_eq!(err.violations[0].value, 200.0);
        assert_eq!(err.violations[0].max, 120.0);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let m = Measurements {
            age: -1,
            blood_pressure: 59.9,
            cholesterol: 401.0,
            glucose: 20.0,
            bmi: 60.0,
            heart_rate: 250.0,
        };
        let err = validate(&m).unwrap_err();
        let fields: Vec<Feature> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, Feature::ALL.to_vec());
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let m = Measurements {
            glucose: f64::NAN,
            bmi: f64::INFINITY,
            ..healthy()
        };
        let err = validate(&m).unwrap_err();
        let fields: Vec<Feature> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec![Feature::Glucose, Feature::Bmi]);
    }

    #[test]
    fn test_error_message_names_fields() {
        let m = Measurements { age: 200, heart_rate: 10.0, ..healthy() };
        let msg = validate(&m).unwrap_err().to_string();
        assert!(msg.starts_with("2 field(s) out of range"));
        assert!(msg.contains("age=200"));
        assert!(msg.contains("heart_rate=10"));
    }

    #[test]
    fn test_feature_order() {
        assert_eq!(healthy().to_features(), [45.0, 130.0, 200.0, 110.0, 28.5, 75.0]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let m: Measurements = serde_json::from_str(
            r#"{"age":45,"blood_pressure":130,"cholesterol":200,"glucose":110,"bmi":28.5,"heart_rate":75}"#,
        )
        .unwrap();
        assert_eq!(m, healthy());
    }
}
