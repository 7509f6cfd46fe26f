//! Disease-risk classifier: trained model or rule-based fallback.
//!
//! The variant is fixed at construction. A loaded model is shared behind an
//! `Arc` and only ever read, so one classifier can serve concurrent requests.

use std::sync::Arc;

use super::round_to;
use crate::domain::{RiskFeatures, RiskLabel, RiskVector};
use crate::ports::RiskModel;
use crate::BioTwinError;

/// Maximum deviation of trained-model probabilities from a unit sum.
const PROBABILITY_SUM_TOLERANCE: f64 = 1.0e-3;

/// Baseline oncology alert emitted by the heuristic rules.
const ONCOLOGY_BASELINE: f64 = 0.15;

/// Cap for heuristic disease scores.
const HEURISTIC_SCORE_CAP: f64 = 0.99;

/// Risk classification strategy.
#[derive(Clone)]
pub enum RiskClassifier {
    /// Probabilities from a loaded model artifact
    Trained(Arc<dyn RiskModel>),
    /// Threshold rules used when no artifact is available
    Heuristic,
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trained(model) => write!(f, "RiskClassifier::Trained({})", model.fingerprint()),
            Self::Heuristic => write!(f, "RiskClassifier::Heuristic"),
        }
    }
}

impl RiskClassifier {
    #[must_use]
    pub fn trained(model: Arc<dyn RiskModel>) -> Self {
        Self::Trained(model)
    }

    #[must_use]
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained(_))
    }

    /// Predict a probability per disease label.
    ///
    /// # Errors
    /// Returns `InvalidModelOutput` if a trained model yields the wrong number
    /// of classes or probabilities that do not sum to ~1.
    pub fn predict(&self, features: &RiskFeatures) -> crate::Result<RiskVector> {
        match self {
            Self::Trained(model) => Self::predict_trained(model.as_ref(), features),
            Self::Heuristic => Ok(Self::predict_heuristic(features)),
        }
    }

    fn predict_trained(model: &dyn RiskModel, features: &RiskFeatures) -> crate::Result<RiskVector> {
        let probs = model.predict_proba(&features.to_array())?;

        if probs.len() != RiskLabel::ALL.len() {
            return Err(BioTwinError::InvalidModelOutput(format!(
                "expected {} class probabilities, got {}",
                RiskLabel::ALL.len(),
                probs.len()
            )));
        }
        if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(BioTwinError::InvalidModelOutput(
                "probabilities must be finite and non-negative".to_string(),
            ));
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(BioTwinError::InvalidModelOutput(format!(
                "probabilities sum to {total}, expected 1"
            )));
        }

        let mut rounded = [0.0; 4];
        for (out, p) in rounded.iter_mut().zip(&probs) {
            *out = round_to(*p, 4);
        }
        Ok(RiskVector::new(rounded))
    }

    /// Rule-based scores. Labels are independent alerts and are not
    /// renormalised to sum to 1.
    fn predict_heuristic(features: &RiskFeatures) -> RiskVector {
        let mut cardio: f64 = 0.1;
        if features.systolic_bp > 140.0 {
            cardio += 0.3;
        }
        if features.cholesterol > 240.0 {
            cardio += 0.3;
        }
        if features.smoker {
            cardio += 0.2;
        }

        let mut diabetes: f64 = 0.05;
        if features.glucose > 120.0 {
            diabetes += 0.5;
        }
        if features.bmi > 30.0 {
            diabetes += 0.3;
        }

        let healthy = (1.0 - cardio - diabetes).max(0.0);

        // Rounded to shed binary accumulation error (0.1 + 0.3 + 0.2 != 0.6).
        RiskVector::new([
            round_to(healthy, 4),
            round_to(cardio.min(HEURISTIC_SCORE_CAP), 4),
            round_to(diabetes.min(HEURISTIC_SCORE_CAP), 4),
            ONCOLOGY_BASELINE,
        ])
    }
}
