//! Radiation dose-response using the Linear-Quadratic (LQ) model.
//!
//! `S = exp(-(α·D + β·D²))` with the dose scaled by the oxygen enhancement
//! ratio: `D = dose · (1 + 2·oxygen) / 3`. Hypoxic tissue therefore receives
//! an effective dose of one third of the physical dose.

use serde::{Deserialize, Serialize};

use super::{require_finite, round_to};
use crate::BioTwinError;

/// Oxygen level assumed for (typically hypoxic) tumor tissue.
pub const TUMOR_OXYGEN_LEVEL: f64 = 0.4;

/// Oxygen level assumed for well-perfused healthy tissue.
pub const HEALTHY_OXYGEN_LEVEL: f64 = 1.0;

/// Therapeutic ratio reported when healthy tissue takes no damage.
pub const THERAPEUTIC_RATIO_SENTINEL: f64 = 100.0;

/// LQ radiosensitivity constants for one tissue type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TissueConstants {
    /// Single-hit kill coefficient (Gy⁻¹)
    pub alpha: f64,
    /// Accumulated-damage coefficient (Gy⁻²)
    pub beta: f64,
}

impl TissueConstants {
    pub const TUMOR: Self = Self {
        alpha: 0.35,
        beta: 0.035,
    };

    pub const HEALTHY: Self = Self {
        alpha: 0.15,
        beta: 0.03,
    };
}

/// Tumor versus healthy tissue outcome for one dose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseComparison {
    pub dose_applied_gy: f64,
    pub target_volume_cm3: f64,
    pub tumor_ablation_pct: f64,
    pub collateral_damage_pct: f64,
    pub therapeutic_ratio: f64,
}

/// Stateless LQ-model solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseResponseSolver;

impl DoseResponseSolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fraction of cells surviving `dose_gy`, in `(0, 1]`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for negative/non-finite dose or oxygen
    /// outside `[0, 1]`.
    pub fn survival_fraction(
        &self,
        dose_gy: f64,
        is_tumor: bool,
        oxygen_level: f64,
    ) -> crate::Result<f64> {
        require_finite("dose_gy", dose_gy)?;
        if dose_gy < 0.0 {
            return Err(BioTwinError::InvalidArgument(format!(
                "dose_gy {dose_gy} must be >= 0"
            )));
        }
        if !(0.0..=1.0).contains(&oxygen_level) {
            return Err(BioTwinError::InvalidArgument(format!(
                "oxygen_level {oxygen_level} out of range [0, 1]"
            )));
        }

        let TissueConstants { alpha, beta } = if is_tumor {
            TissueConstants::TUMOR
        } else {
            TissueConstants::HEALTHY
        };

        let oer = 1.0 + 2.0 * oxygen_level;
        let effective_dose = dose_gy * oer / 3.0;
        let survival = (-(alpha * effective_dose + beta * effective_dose.powi(2))).exp();

        // exp underflows to 0 for extreme doses; survival stays strictly positive.
        Ok(survival.max(f64::MIN_POSITIVE))
    }

    /// Compare hypoxic tumor against oxygenated healthy tissue at `dose_gy`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a negative dose or target volume.
    pub fn compare_dose(
        &self,
        target_volume_cm3: f64,
        dose_gy: f64,
    ) -> crate::Result<DoseComparison> {
        require_finite("target_volume_cm3", target_volume_cm3)?;
        if target_volume_cm3 < 0.0 {
            return Err(BioTwinError::InvalidArgument(format!(
                "target_volume_cm3 {target_volume_cm3} must be >= 0"
            )));
        }

        let tumor_survival = self.survival_fraction(dose_gy, true, TUMOR_OXYGEN_LEVEL)?;
        let healthy_survival = self.survival_fraction(dose_gy, false, HEALTHY_OXYGEN_LEVEL)?;

        let ablation = (1.0 - tumor_survival) * 100.0;
        let collateral = (1.0 - healthy_survival) * 100.0;

        let therapeutic_ratio = if collateral > 0.0 {
            round_to(ablation / collateral, 2)
        } else {
            THERAPEUTIC_RATIO_SENTINEL
        };

        Ok(DoseComparison {
            dose_applied_gy: dose_gy,
            target_volume_cm3,
            tumor_ablation_pct: round_to(ablation, 2),
            collateral_damage_pct: round_to(collateral, 2),
            therapeutic_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dose_full_survival() {
        let solver = DoseResponseSolver::new();
        assert_eq!(solver.survival_fraction(0.0, true, 0.4).unwrap(), 1.0);
        assert_eq!(solver.survival_fraction(0.0, false, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_survival_in_unit_interval_and_decreasing() {
        let solver = DoseResponseSolver::new();
        for &is_tumor in &[true, false] {
            for &oxygen in &[0.0, 0.4, 1.0] {
                let mut previous = 1.0 + f64::EPSILON;
                for i in 0..40 {
                    let dose = f64::from(i) * 0.5;
                    let s = solver.survival_fraction(dose, is_tumor, oxygen).unwrap();
                    assert!(s > 0.0 && s <= 1.0);
                    assert!(s < previous, "not decreasing at dose {dose}");
                    previous = s;
                }
            }
        }
    }

    #[test]
    fn test_known_value() {
        // Fully oxygenated healthy tissue: effective dose = physical dose.
        let solver = DoseResponseSolver::new();
        let s = solver.survival_fraction(2.0, false, 1.0).unwrap();
        let expected = (-(0.15 * 2.0 + 0.03 * 4.0_f64)).exp();
        assert!((s - expected).abs() < 1e-12);
    }

    #[test]
    fn test_hypoxia_protects() {
        let solver = DoseResponseSolver::new();
        let hypoxic = solver.survival_fraction(5.0, true, 0.0).unwrap();
        let oxic = solver.survival_fraction(5.0, true, 1.0).unwrap();
        assert!(hypoxic > oxic);
    }

    #[test]
    fn test_extreme_dose_stays_positive() {
        let solver = DoseResponseSolver::new();
        let s = solver.survival_fraction(1.0e6, true, 1.0).unwrap();
        assert!(s > 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let solver = DoseResponseSolver::new();
        assert!(solver.survival_fraction(-1.0, true, 0.5).is_err());
        assert!(solver.survival_fraction(1.0, true, 1.5).is_err());
        assert!(solver.survival_fraction(f64::INFINITY, true, 0.5).is_err());
        assert!(solver.compare_dose(-2.0, 10.0).is_err());
    }

    #[test]
    fn test_compare_dose_zero_uses_sentinel() {
        let solver = DoseResponseSolver::new();
        let cmp = solver.compare_dose(30.0, 0.0).unwrap();
        assert_eq!(cmp.collateral_damage_pct, 0.0);
        assert_eq!(cmp.therapeutic_ratio, THERAPEUTIC_RATIO_SENTINEL);
    }

    #[test]
    fn test_compare_dose_reports_percentages() {
        let solver = DoseResponseSolver::new();
        let cmp = solver.compare_dose(30.0, 10.0).unwrap();
        assert!(cmp.tumor_ablation_pct > 0.0 && cmp.tumor_ablation_pct < 100.0);
        assert!(cmp.collateral_damage_pct > 0.0 && cmp.collateral_damage_pct < 100.0);
        assert!(cmp.therapeutic_ratio > 0.0);
        assert_eq!(cmp.dose_applied_gy, 10.0);
        assert_eq!(cmp.target_volume_cm3, 30.0);
    }
}
