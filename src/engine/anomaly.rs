//! Z-score anomaly detection against population norms.
//!
//! Only markers present in the norm table are checked; anything else in the
//! sample passes through without an anomaly or an error.

use super::round_to;
use crate::domain::{Anomaly, BiomarkerSample, Severity};

const WARNING_Z: f64 = 3.0;
const CRITICAL_Z: f64 = 4.5;

/// Population mean and standard deviation for one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationNorm {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    norms: Vec<(String, PopulationNorm)>,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            norms: vec![
                (
                    "white_blood_cells".to_string(),
                    PopulationNorm {
                        mean: 7000.0,
                        std: 2000.0,
                    },
                ),
                (
                    "hemoglobin".to_string(),
                    PopulationNorm {
                        mean: 15.0,
                        std: 2.0,
                    },
                ),
                (
                    "platelets".to_string(),
                    PopulationNorm {
                        mean: 300_000.0,
                        std: 50_000.0,
                    },
                ),
            ],
        }
    }
}

impl AnomalyDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a norm. Norms with a non-positive std are ignored.
    #[must_use]
    pub fn with_norm(mut self, marker: impl Into<String>, mean: f64, std: f64) -> Self {
        let marker = marker.into();
        if !(std > 0.0 && std.is_finite() && mean.is_finite()) {
            tracing::warn!("Ignoring invalid norm for {marker}: mean={mean}, std={std}");
            return self;
        }
        let norm = PopulationNorm { mean, std };
        match self.norms.iter_mut().find(|(m, _)| *m == marker) {
            Some(entry) => entry.1 = norm,
            None => self.norms.push((marker, norm)),
        }
        self
    }

    #[must_use]
    pub fn norm(&self, marker: &str) -> Option<PopulationNorm> {
        self.norms
            .iter()
            .find(|(m, _)| m == marker)
            .map(|(_, n)| *n)
    }

    /// Flag markers with `|z| > 3`; `|z| > 4.5` is critical.
    ///
    /// Anomalies are returned in sample insertion order.
    #[must_use]
    pub fn detect(&self, sample: &BiomarkerSample) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for (marker, value) in sample.iter() {
            let Some(norm) = self.norm(marker) else {
                continue;
            };

            let z = (value - norm.mean) / norm.std;
            if z.abs() <= WARNING_Z || z.is_nan() {
                continue;
            }

            let severity = if z.abs() > CRITICAL_Z {
                Severity::Critical
            } else {
                Severity::Warning
            };

            anomalies.push(Anomaly {
                marker: marker.to_string(),
                value,
                z_score: round_to(z, 2),
                severity,
                message: format!("Value is {z:.1} standard deviations from norm."),
            });
        }

        if !anomalies.is_empty() {
            tracing::debug!(
                "Detected {} anomalies in {} markers",
                anomalies.len(),
                sample.len()
            );
        }

        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hemoglobin_boundaries() {
        let detector = AnomalyDetector::new();

        let at_three = BiomarkerSample::new().with("hemoglobin", 21.0);
        assert!(detector.detect(&at_three).is_empty());

        let warning = detector.detect(&BiomarkerSample::new().with("hemoglobin", 23.0));
        assert_eq!(warning.len(), 1);
        assert_eq!(warning[0].z_score, 4.0);
        assert_eq!(warning[0].severity, Severity::Warning);

        let critical = detector.detect(&BiomarkerSample::new().with("hemoglobin", 24.5));
        assert_eq!(critical[0].z_score, 4.75);
        assert_eq!(critical[0].severity, Severity::Critical);
    }

    #[test]
    fn test_low_values_flagged() {
        let detector = AnomalyDetector::new();
        let anomalies = detector.detect(&BiomarkerSample::new().with("platelets", 50_000.0));
        assert_eq!(anomalies[0].z_score, -5.0);
        assert_eq!(anomalies[0].severity, Severity::Critical);
        assert_eq!(
            anomalies[0].message,
            "Value is -5.0 standard deviations from norm."
        );
    }

    #[test]
    fn test_unknown_markers_ignored() {
        let detector = AnomalyDetector::new();
        let sample = BiomarkerSample::new()
            .with("ferritin", 1.0e9)
            .with("hemoglobin", 15.0);
        assert!(detector.detect(&sample).is_empty());
    }

    #[test]
    fn test_order_follows_sample() {
        let detector = AnomalyDetector::new();
        let sample = BiomarkerSample::new()
            .with("platelets", 600_000.0)
            .with("ferritin", 3.0)
            .with("white_blood_cells", 20_000.0)
            .with("hemoglobin", 5.0);
        let markers: Vec<_> = detector
            .detect(&sample)
            .into_iter()
            .map(|a| a.marker)
            .collect();
        assert_eq!(markers, vec!["platelets", "white_blood_cells", "hemoglobin"]);
    }

    #[test]
    fn test_custom_norm() {
        let detector = AnomalyDetector::new()
            .with_norm("glucose", 100.0, 10.0)
            .with_norm("broken", 1.0, 0.0);
        assert!(detector.norm("broken").is_none());
        let anomalies = detector.detect(&BiomarkerSample::new().with("glucose", 140.0));
        assert_eq!(anomalies[0].severity, Severity::Warning);
    }
}
