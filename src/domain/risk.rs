//! Disease-risk classifier inputs and outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::BioTwinError;

/// Fixed disease label set, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Cardiovascular_Risk")]
    CardiovascularRisk,
    #[serde(rename = "Diabetes_Type2")]
    DiabetesType2,
    #[serde(rename = "Oncology_Alert")]
    OncologyAlert,
}

impl RiskLabel {
    /// All labels in model output order.
    pub const ALL: [RiskLabel; 4] = [
        Self::Healthy,
        Self::CardiovascularRisk,
        Self::DiabetesType2,
        Self::OncologyAlert,
    ];

    /// Wire name of the label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::CardiovascularRisk => "Cardiovascular_Risk",
            Self::DiabetesType2 => "Diabetes_Type2",
            Self::OncologyAlert => "Oncology_Alert",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Healthy => 0,
            Self::CardiovascularRisk => 1,
            Self::DiabetesType2 => 2,
            Self::OncologyAlert => 3,
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability per [`RiskLabel`], each clamped into `[0, 1]`.
///
/// Values are not required to sum to 1: the heuristic classifier treats
/// labels as independent alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<RiskLabel, f64>", from = "BTreeMap<RiskLabel, f64>")]
pub struct RiskVector {
    probabilities: [f64; 4],
}

impl RiskVector {
    /// Build from probabilities in [`RiskLabel::ALL`] order.
    ///
    /// Values are clamped into `[0, 1]`; NaN becomes 0.
    #[must_use]
    pub fn new(probabilities: [f64; 4]) -> Self {
        let mut clamped = [0.0; 4];
        for (out, p) in clamped.iter_mut().zip(probabilities) {
            *out = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        }
        Self {
            probabilities: clamped,
        }
    }

    #[must_use]
    pub fn get(&self, label: RiskLabel) -> f64 {
        self.probabilities[label.index()]
    }

    /// Iterate `(label, probability)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskLabel, f64)> + '_ {
        RiskLabel::ALL.iter().map(move |l| (*l, self.get(*l)))
    }

    /// Label with the highest probability (first wins on ties).
    #[must_use]
    pub fn dominant(&self) -> RiskLabel {
        let mut best = RiskLabel::Healthy;
        for (label, p) in self.iter() {
            if p > self.get(best) {
                best = label;
            }
        }
        best
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }
}

impl From<RiskVector> for BTreeMap<RiskLabel, f64> {
    fn from(v: RiskVector) -> Self {
        v.iter().collect()
    }
}

impl From<BTreeMap<RiskLabel, f64>> for RiskVector {
    fn from(map: BTreeMap<RiskLabel, f64>) -> Self {
        let mut probabilities = [0.0; 4];
        for (label, p) in map {
            probabilities[label.index()] = p;
        }
        Self::new(probabilities)
    }
}

/// Six-feature classifier input.
///
/// Order: age, bmi, systolic_bp, glucose, cholesterol, smoker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    /// Age in years
    pub age: f64,
    /// Body mass index (kg/m²)
    pub bmi: f64,
    /// Systolic blood pressure (mmHg)
    pub systolic_bp: f64,
    /// Fasting glucose (mg/dL)
    pub glucose: f64,
    /// Total cholesterol (mg/dL)
    pub cholesterol: f64,
    pub smoker: bool,
}

impl RiskFeatures {
    /// Number of model input features.
    pub const LEN: usize = 6;

    /// Marker keys read from a biomarker sample, age excluded.
    pub const SAMPLE_KEYS: [&'static str; 5] =
        ["bmi", "systolic_bp", "glucose", "cholesterol", "smoker"];

    /// Convert to the model input vector.
    #[must_use]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.age,
            self.bmi,
            self.systolic_bp,
            self.glucose,
            self.cholesterol,
            if self.smoker { 1.0 } else { 0.0 },
        ]
    }

    /// Parse the model input vector.
    ///
    /// # Errors
    /// Returns `InvalidArgument` on non-finite values or a smoker flag other
    /// than 0 or 1.
    pub fn from_array(v: [f64; 6]) -> crate::Result<Self> {
        if let Some(i) = v.iter().position(|x| !x.is_finite()) {
            return Err(BioTwinError::InvalidArgument(format!(
                "feature {i} is not finite"
            )));
        }
        let smoker = match v[5] {
            x if x == 0.0 => false,
            x if x == 1.0 => true,
            x => {
                return Err(BioTwinError::InvalidArgument(format!(
                    "smoker flag {x} must be 0 or 1"
                )))
            }
        };
        Ok(Self {
            age: v[0],
            bmi: v[1],
            systolic_bp: v[2],
            glucose: v[3],
            cholesterol: v[4],
            smoker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_clamps() {
        let v = RiskVector::new([1.2, -0.1, f64::NAN, 0.5]);
        assert_eq!(v.get(RiskLabel::Healthy), 1.0);
        assert_eq!(v.get(RiskLabel::CardiovascularRisk), 0.0);
        assert_eq!(v.get(RiskLabel::DiabetesType2), 0.0);
        assert_eq!(v.get(RiskLabel::OncologyAlert), 0.5);
    }

    #[test]
    fn test_dominant_label() {
        let v = RiskVector::new([0.1, 0.6, 0.2, 0.1]);
        assert_eq!(v.dominant(), RiskLabel::CardiovascularRisk);
    }

    #[test]
    fn test_wire_labels() {
        let v = RiskVector::new([0.25, 0.25, 0.25, 0.25]);
        let json = serde_json::to_value(v).expect("serialize");
        assert_eq!(json["Cardiovascular_Risk"], 0.25);
        assert_eq!(json["Oncology_Alert"], 0.25);
    }

    #[test]
    fn test_features_from_array() {
        let f = RiskFeatures::from_array([40.0, 22.0, 150.0, 80.0, 250.0, 1.0])
            .expect("Should parse");
        assert!(f.smoker);
        assert_eq!(f.to_array()[2], 150.0);

        assert!(RiskFeatures::from_array([40.0, 22.0, 150.0, 80.0, 250.0, 0.5]).is_err());
        assert!(RiskFeatures::from_array([f64::NAN, 22.0, 150.0, 80.0, 250.0, 0.0]).is_err());
    }
}
