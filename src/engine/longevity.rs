//! Lifestyle-adjusted life expectancy and biological age.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::round_to;

/// Global average life expectancy (years).
pub const BASE_EXPECTANCY_YEARS: f64 = 82.0;

/// Years gained (+) or lost (-) per lifestyle factor.
const FACTOR_COEFFICIENTS: [(&str, f64); 6] = [
    ("smoker", -10.5),
    ("obesity", -4.2),
    ("high_blood_pressure", -5.1),
    ("diabetes", -6.5),
    ("active_lifestyle", 3.5),
    ("good_diet", 2.2),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongevityResult {
    pub chronological_age: u32,
    pub predicted_lifespan: f64,
    pub biological_age: f64,
    pub years_lost_to_lifestyle: f64,
}

/// Stateless actuarial estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongevityEstimator;

impl LongevityEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Coefficient for a known factor.
    #[must_use]
    pub fn coefficient(&self, factor: &str) -> Option<f64> {
        FACTOR_COEFFICIENTS
            .iter()
            .find(|(name, _)| *name == factor)
            .map(|(_, c)| *c)
    }

    /// Estimate lifespan for `current_age` given a set of factors.
    ///
    /// Unknown factors are ignored and duplicates count once.
    /// `biological_age = age + years_lost / 2`.
    pub fn predict<I, S>(&self, current_age: u32, risk_factors: I) -> LongevityResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let factors: BTreeSet<String> = risk_factors
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();

        let adjustment: f64 = factors.iter().filter_map(|f| self.coefficient(f)).sum();
        let predicted = BASE_EXPECTANCY_YEARS + adjustment;
        let years_lost = BASE_EXPECTANCY_YEARS - predicted;
        let biological_age = f64::from(current_age) + years_lost * 0.5;

        LongevityResult {
            chronological_age: current_age,
            predicted_lifespan: round_to(predicted, 1),
            biological_age: round_to(biological_age, 1),
            years_lost_to_lifestyle: round_to(years_lost, 1),
        }
    }
}
