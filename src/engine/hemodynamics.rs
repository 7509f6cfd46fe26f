//! Laminar blood flow via Poiseuille's law: `Q = π·r⁴·ΔP / (8·η·L)`.
//!
//! Inputs use clinical units (mm, mmHg, cm); the solver works in SI and
//! reports mL/min.

use serde::{Deserialize, Serialize};

use super::{require_finite, round_to};
use crate::BioTwinError;

const PASCALS_PER_MMHG: f64 = 133.322;
const ML_PER_CUBIC_METER: f64 = 1_000_000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Whole-blood dynamic viscosity (Pa·s).
pub const BLOOD_VISCOSITY_PA_S: f64 = 0.0035;

/// Reference coronary artery used by the blockage model.
const CORONARY_RADIUS_MM: f64 = 2.0;
const CORONARY_PRESSURE_DIFF_MMHG: f64 = 100.0;
const CORONARY_LENGTH_CM: f64 = 5.0;

/// Lumen radius floor for a fully occluded vessel.
pub const MIN_LUMEN_RADIUS_MM: f64 = 1.0e-3;

/// Flow comparison between an open and a partially blocked artery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockageReport {
    pub blockage_pct: f64,
    /// mL/min through the open vessel
    pub healthy_flow: f64,
    /// mL/min through the narrowed vessel
    pub restricted_flow: f64,
    /// In [0, 100]
    pub flow_reduction_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct HemodynamicsSolver {
    viscosity_pa_s: f64,
}

impl Default for HemodynamicsSolver {
    fn default() -> Self {
        Self {
            viscosity_pa_s: BLOOD_VISCOSITY_PA_S,
        }
    }
}

impl HemodynamicsSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Volumetric flow in mL/min, rounded to 2 decimals.
    ///
    /// # Errors
    /// Returns `InvalidArgument` unless radius and length are positive and all
    /// inputs are finite.
    pub fn flow_rate(
        &self,
        radius_mm: f64,
        pressure_diff_mmhg: f64,
        length_cm: f64,
    ) -> crate::Result<f64> {
        require_finite("radius_mm", radius_mm)?;
        require_finite("pressure_diff_mmhg", pressure_diff_mmhg)?;
        require_finite("length_cm", length_cm)?;
        if radius_mm <= 0.0 || length_cm <= 0.0 {
            return Err(BioTwinError::InvalidArgument(format!(
                "radius_mm ({radius_mm}) and length_cm ({length_cm}) must be > 0"
            )));
        }

        let radius_m = radius_mm / 1000.0;
        let length_m = length_cm / 100.0;
        let pressure_pa = pressure_diff_mmhg * PASCALS_PER_MMHG;

        let flow_m3_s = std::f64::consts::PI * radius_m.powi(4) * pressure_pa
            / (8.0 * self.viscosity_pa_s * length_m);

        Ok(round_to(
            flow_m3_s * SECONDS_PER_MINUTE * ML_PER_CUBIC_METER,
            2,
        ))
    }

    /// Flow loss through a coronary artery narrowed by `blockage_pct`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `blockage_pct` is outside `[0, 100]`.
    pub fn arterial_blockage(&self, blockage_pct: f64) -> crate::Result<BlockageReport> {
        if !(0.0..=100.0).contains(&blockage_pct) {
            return Err(BioTwinError::InvalidArgument(format!(
                "blockage_pct {blockage_pct} out of range [0, 100]"
            )));
        }

        let blocked_radius =
            (CORONARY_RADIUS_MM * (1.0 - blockage_pct / 100.0)).max(MIN_LUMEN_RADIUS_MM);

        let healthy_flow = self.flow_rate(
            CORONARY_RADIUS_MM,
            CORONARY_PRESSURE_DIFF_MMHG,
            CORONARY_LENGTH_CM,
        )?;
        let restricted_flow = self.flow_rate(
            blocked_radius,
            CORONARY_PRESSURE_DIFF_MMHG,
            CORONARY_LENGTH_CM,
        )?;

        let flow_reduction_pct = if healthy_flow > 0.0 {
            round_to((1.0 - restricted_flow / healthy_flow) * 100.0, 2).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(BlockageReport {
            blockage_pct,
            healthy_flow,
            restricted_flow,
            flow_reduction_pct,
        })
    }
}
