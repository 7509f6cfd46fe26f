//! Simulation request configuration and cell-cycle state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BioTwinError;

/// Status of the p53 tumor-suppressor gene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum P53Status {
    /// Damage sensing intact: checkpoints arrest stressed cells
    #[default]
    Functional,
    /// Loss of function: checkpoints never arrest
    Mutated,
}

impl FromStr for P53Status {
    type Err = BioTwinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" => Ok(Self::Functional),
            "mutated" => Ok(Self::Mutated),
            other => Err(BioTwinError::InvalidArgument(format!(
                "p53_status must be 'functional' or 'mutated', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for P53Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Functional => write!(f, "functional"),
            Self::Mutated => write!(f, "mutated"),
        }
    }
}

/// Validated per-request simulation parameters.
///
/// Fields are private so a constructed config always satisfies its ranges;
/// deserialization goes through the same validation as [`SimulationConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationConfig")]
pub struct SimulationConfig {
    p53_status: P53Status,
    cellular_stress: f64,
    time_steps: u32,
    radiation_dose_gy: f64,
    oxygen_level: f64,
}

#[derive(Deserialize)]
struct RawSimulationConfig {
    #[serde(default)]
    p53_status: P53Status,
    cellular_stress: f64,
    time_steps: i64,
    #[serde(default)]
    radiation_dose_gy: f64,
    #[serde(default = "default_oxygen_level")]
    oxygen_level: f64,
}

fn default_oxygen_level() -> f64 {
    1.0
}

impl TryFrom<RawSimulationConfig> for SimulationConfig {
    type Error = BioTwinError;

    fn try_from(raw: RawSimulationConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.p53_status,
            raw.cellular_stress,
            raw.time_steps,
            raw.radiation_dose_gy,
            raw.oxygen_level,
        )
    }
}

impl SimulationConfig {
    /// Build a config, rejecting every out-of-range value at once.
    ///
    /// # Errors
    /// Returns `InvalidArgument` listing all violations.
    pub fn new(
        p53_status: P53Status,
        cellular_stress: f64,
        time_steps: i64,
        radiation_dose_gy: f64,
        oxygen_level: f64,
    ) -> crate::Result<Self> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&cellular_stress) {
            errors.push(format!(
                "cellular_stress {cellular_stress} out of range [0, 1]"
            ));
        }
        if time_steps <= 0 {
            errors.push(format!("time_steps {time_steps} must be > 0"));
        } else if time_steps > i64::from(u32::MAX) {
            errors.push(format!("time_steps {time_steps} exceeds {}", u32::MAX));
        }
        if !radiation_dose_gy.is_finite() || radiation_dose_gy < 0.0 {
            errors.push(format!("radiation_dose_gy {radiation_dose_gy} must be >= 0"));
        }
        if !(0.0..=1.0).contains(&oxygen_level) {
            errors.push(format!("oxygen_level {oxygen_level} out of range [0, 1]"));
        }

        if !errors.is_empty() {
            return Err(BioTwinError::InvalidArgument(errors.join("; ")));
        }

        Ok(Self {
            p53_status,
            cellular_stress,
            time_steps: time_steps as u32,
            radiation_dose_gy,
            oxygen_level,
        })
    }

    /// Config without radiation exposure, fully oxygenated.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if stress or time steps are out of range.
    pub fn unirradiated(
        p53_status: P53Status,
        cellular_stress: f64,
        time_steps: i64,
    ) -> crate::Result<Self> {
        Self::new(p53_status, cellular_stress, time_steps, 0.0, 1.0)
    }

    #[must_use]
    pub fn p53_status(&self) -> P53Status {
        self.p53_status
    }

    #[must_use]
    pub fn cellular_stress(&self) -> f64 {
        self.cellular_stress
    }

    #[must_use]
    pub fn time_steps(&self) -> u32 {
        self.time_steps
    }

    #[must_use]
    pub fn radiation_dose_gy(&self) -> f64 {
        self.radiation_dose_gy
    }

    #[must_use]
    pub fn oxygen_level(&self) -> f64 {
        self.oxygen_level
    }
}

/// Cell-cycle phase. Transitions only in the fixed order G1 → S → G2 → M → G1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellPhase {
    #[default]
    G1,
    S,
    G2,
    M,
}

impl CellPhase {
    /// The phase entered when the checkpoint passes.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::G1 => Self::S,
            Self::S => Self::G2,
            Self::G2 => Self::M,
            Self::M => Self::G1,
        }
    }
}

impl std::fmt::Display for CellPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::G1 => write!(f, "G1"),
            Self::S => write!(f, "S"),
            Self::G2 => write!(f, "G2"),
            Self::M => write!(f, "M"),
        }
    }
}

/// Mutable state of a single simulated cell line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellCycleState {
    pub phase: CellPhase,
    pub division_count: u32,
    /// Accumulated unrepaired damage; never decreases within a run
    pub mutation_load: f64,
}

/// Result of one `simulate_mitosis` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitosisOutcome {
    /// Divisions completed during this call
    pub divisions: u32,
    /// Cancer risk score in [0, 100]
    pub cancer_risk_score: f64,
    /// One entry per time step
    pub log: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = SimulationConfig::new(P53Status::Functional, 0.75, 50, 2.0, 0.4)
            .expect("Should be valid");
        assert_eq!(config.time_steps(), 50);
        assert!((config.oxygen_level() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_positive_time_steps() {
        let err = SimulationConfig::unirradiated(P53Status::Functional, 0.5, 0)
            .expect_err("Zero steps must be rejected");
        assert!(matches!(err, BioTwinError::InvalidArgument(_)));
    }

    #[test]
    fn test_collects_all_violations() {
        let err = SimulationConfig::new(P53Status::Mutated, 1.5, -3, -1.0, 2.0)
            .expect_err("Should be invalid");
        let msg = err.to_string();
        assert!(msg.contains("cellular_stress"));
        assert!(msg.contains("time_steps"));
        assert!(msg.contains("radiation_dose_gy"));
        assert!(msg.contains("oxygen_level"));
    }

    #[test]
    fn test_rejects_nan_stress() {
        assert!(SimulationConfig::unirradiated(P53Status::Functional, f64::NAN, 10).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: SimulationConfig = serde_json::from_str(
            r#"{"p53_status":"mutated","cellular_stress":0.3,"time_steps":8}"#,
        )
        .expect("Should parse");
        assert_eq!(ok.p53_status(), P53Status::Mutated);
        assert!((ok.oxygen_level() - 1.0).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<SimulationConfig>(
            r#"{"cellular_stress":0.3,"time_steps":0}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_p53_from_str() {
        assert_eq!("Mutated".parse::<P53Status>().unwrap(), P53Status::Mutated);
        assert!("broken".parse::<P53Status>().is_err());
    }

    #[test]
    fn test_phase_cycle_order() {
        let mut phase = CellPhase::G1;
        let mut seen = Vec::new();
        for _ in 0..4 {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(seen, vec![CellPhase::S, CellPhase::G2, CellPhase::M, CellPhase::G1]);
    }
}
