//! T-cell versus pathogen attrition model.

use serde::{Deserialize, Serialize};

use super::require_finite;
use crate::BioTwinError;

/// Default T-cell count for a twin run.
pub const DEFAULT_T_CELLS: u64 = 1200;
/// Default pathogen load for a twin run.
pub const DEFAULT_PATHOGEN_LOAD: u64 = 5000;
/// Default T-cell kill efficiency for a twin run.
pub const DEFAULT_EFFICIENCY: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfectionStatus {
    #[serde(rename = "Infection Cleared")]
    Cleared,
    #[serde(rename = "Active Infection")]
    Active,
}

impl std::fmt::Display for InfectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleared => write!(f, "Infection Cleared"),
            Self::Active => write!(f, "Active Infection"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub remaining_pathogens: u64,
    pub status: InfectionStatus,
}

/// Immune engagement state. Pathogen load carries over between battles.
#[derive(Debug, Clone)]
pub struct ImmuneDefenseSim {
    t_cells: u64,
    pathogens: u64,
}

impl Default for ImmuneDefenseSim {
    fn default() -> Self {
        Self::new(DEFAULT_T_CELLS, DEFAULT_PATHOGEN_LOAD)
    }
}

impl ImmuneDefenseSim {
    #[must_use]
    pub fn new(t_cells: u64, pathogens: u64) -> Self {
        Self { t_cells, pathogens }
    }

    #[must_use]
    pub fn pathogens(&self) -> u64 {
        self.pathogens
    }

    /// One engagement: T cells kill `floor(t_cells * efficiency)` pathogens,
    /// survivors replicate by 1.2x (floored).
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `efficiency_rate` is outside `[0, 1]`.
    pub fn run_battle(&mut self, efficiency_rate: f64) -> crate::Result<BattleOutcome> {
        require_finite("efficiency_rate", efficiency_rate)?;
        if !(0.0..=1.0).contains(&efficiency_rate) {
            return Err(BioTwinError::InvalidArgument(format!(
                "efficiency_rate must be in [0, 1], got {efficiency_rate}"
            )));
        }

        let kills = (self.t_cells as f64 * efficiency_rate).floor() as u64;
        let survivors = self.pathogens.saturating_sub(kills);
        // Integer x6/5 keeps the 1.2x growth exact.
        self.pathogens = survivors.saturating_mul(6) / 5;

        let status = if self.pathogens == 0 {
            InfectionStatus::Cleared
        } else {
            InfectionStatus::Active
        };
        tracing::debug!(
            "Immune battle: {kills} killed, {} remaining ({status})",
            self.pathogens
        );

        Ok(BattleOutcome {
            remaining_pathogens: self.pathogens,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_battle() {
        let outcome = ImmuneDefenseSim::default()
            .run_battle(DEFAULT_EFFICIENCY)
            .unwrap();
        assert_eq!(outcome.remaining_pathogens, 4776);
        assert_eq!(outcome.status, InfectionStatus::Active);
    }

    #[test]
    fn test_overwhelming_response_clears() {
        let mut sim = ImmuneDefenseSim::new(10_000, 500);
        let outcome = sim.run_battle(0.5).unwrap();
        assert_eq!(outcome.remaining_pathogens, 0);
        assert_eq!(outcome.status, InfectionStatus::Cleared);
        assert_eq!(
            serde_json::to_value(outcome.status).unwrap(),
            "Infection Cleared"
        );
    }

    #[test]
    fn test_load_carries_over() {
        let mut sim = ImmuneDefenseSim::new(100, 1000);
        sim.run_battle(1.0).unwrap();
        assert_eq!(sim.pathogens(), 1080);
        sim.run_battle(1.0).unwrap();
        assert_eq!(sim.pathogens(), 1176);
    }

    #[test]
    fn test_rejects_bad_efficiency() {
        let mut sim = ImmuneDefenseSim::default();
        assert!(sim.run_battle(1.5).is_err());
        assert!(sim.run_battle(f64::NAN).is_err());
    }
}
