//! Stochastic cell-cycle engine with a p53-gated DNA-damage checkpoint.
//!
//! Each time step runs one checkpoint:
//! `effective_stress = cellular_stress - r`, `r ~ U(0, 0.2)`.
//! Functional p53 passes iff `effective_stress < 0.6`; mutated p53 always
//! passes. A pass advances the phase (entering M counts a division); a
//! failure arrests the cell and adds 0.05 to the mutation load.
//!
//! `risk = min(100, divisions / time_steps * 100 + mutation_load * 50)`

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::round_to;
use crate::domain::{CellCycleState, CellPhase, MitosisOutcome, P53Status};
use crate::BioTwinError;

const MAX_STRESS_PERTURBATION: f64 = 0.2;
const ARREST_THRESHOLD: f64 = 0.6;
const DAMAGE_PER_ARREST: f64 = 0.05;
const MUTATION_RISK_WEIGHT: f64 = 50.0;

/// Cell-cycle simulator owning one cell line's state and its random source.
pub struct CellCycleEngine<R: Rng> {
    p53_status: P53Status,
    state: CellCycleState,
    rng: R,
}

impl CellCycleEngine<ChaCha8Rng> {
    /// Engine with a deterministic ChaCha8 stream.
    #[must_use]
    pub fn seeded(p53_status: P53Status, seed: u64) -> Self {
        Self::new(p53_status, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> CellCycleEngine<R> {
    /// Create an engine starting in G1 with no accumulated damage.
    pub fn new(p53_status: P53Status, rng: R) -> Self {
        Self {
            p53_status,
            state: CellCycleState::default(),
            rng,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CellCycleState {
        &self.state
    }

    #[must_use]
    pub fn p53_status(&self) -> P53Status {
        self.p53_status
    }

    /// Run `time_steps` checkpoints under constant `cellular_stress`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `time_steps` is 0 or stress is outside `[0, 1]`.
    pub fn simulate_mitosis(
        &mut self,
        time_steps: u32,
        cellular_stress: f64,
    ) -> crate::Result<MitosisOutcome> {
        if time_steps == 0 {
            return Err(BioTwinError::InvalidArgument(
                "time_steps must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&cellular_stress) {
            return Err(BioTwinError::InvalidArgument(format!(
                "cellular_stress {cellular_stress} out of range [0, 1]"
            )));
        }

        let mut divisions = 0u32;
        let mut log = Vec::with_capacity(time_steps as usize);

        for t in 0..time_steps {
            if self.checkpoint_passes(cellular_stress) {
                self.state.phase = self.state.phase.next();
                if self.state.phase == CellPhase::M {
                    divisions += 1;
                    self.state.division_count += 1;
                }
                log.push(format!("T{t}: {} -> OK", self.state.phase));
            } else {
                self.state.mutation_load += DAMAGE_PER_ARREST;
                log.push(format!("T{t}: ARREST -> Repairing DNA"));
            }
        }

        let division_rate = f64::from(divisions) / f64::from(time_steps);
        let risk = division_rate * 100.0 + self.state.mutation_load * MUTATION_RISK_WEIGHT;
        let cancer_risk_score = round_to(risk, 2).clamp(0.0, 100.0);

        tracing::debug!(
            "Mitosis: steps={}, divisions={}, mutation_load={:.2}, risk={:.2}",
            time_steps,
            divisions,
            self.state.mutation_load,
            cancer_risk_score
        );

        Ok(MitosisOutcome {
            divisions,
            cancer_risk_score,
            log,
        })
    }

    fn checkpoint_passes(&mut self, cellular_stress: f64) -> bool {
        // Drawn even when p53 is mutated so both statuses consume the stream identically.
        let r = self.rng.gen_range(0.0..MAX_STRESS_PERTURBATION);
        let effective_stress = cellular_stress - r;

        match self.p53_status {
            P53Status::Mutated => true,
            P53Status::Functional => effective_stress < ARREST_THRESHOLD,
        }
    }
}
