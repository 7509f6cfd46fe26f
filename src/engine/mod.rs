//! Engine layer: Simulation solvers and predictive models.
//!
//! Every component here is pure computation: no file or network I/O, no
//! process-global state. Randomness is always supplied by the caller.

mod anomaly;
mod cell_cycle;
mod dose_response;
mod genetics;
mod hemodynamics;
mod immune;
mod isotope;
mod longevity;
mod microbiome;
mod risk;

pub use anomaly::{AnomalyDetector, PopulationNorm};
pub use cell_cycle::CellCycleEngine;
pub use dose_response::{DoseComparison, DoseResponseSolver, TissueConstants};
pub use genetics::GeneticSequencer;
pub use hemodynamics::{BlockageReport, HemodynamicsSolver};
pub use immune::{
    BattleOutcome, ImmuneDefenseSim, InfectionStatus, DEFAULT_EFFICIENCY as DEFAULT_IMMUNE_EFFICIENCY,
};
pub use isotope::IsotopeDecayCalculator;
pub use longevity::{LongevityEstimator, LongevityResult};
pub use microbiome::shannon_index;
pub use risk::RiskClassifier;

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn require_finite(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(crate::BioTwinError::InvalidArgument(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-2.345, 1), -2.3);
        assert_eq!(round_to(1254.3297, 4), 1254.3297);
    }
}
