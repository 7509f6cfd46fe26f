//! Simulation orchestrator: Assembles one digital-twin snapshot.
//!
//! A run drives the stochastic cell-cycle engine, then folds in the
//! deterministic solvers and, when biomarkers are supplied, the anomaly
//! detector and risk classifier:
//! - `Liver` carries the cell-cycle cancer-risk score
//! - `Heart` carries the hemodynamic effect of the cardiovascular risk
//! - genetics carry screened markers and the lifestyle-adjusted age

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;

use crate::domain::{
    BiomarkerSample, OrganStats, P53Status, PatientProfile, PatientTwin, RiskFeatures, RiskLabel,
    RiskVector, Severity, SimulationConfig, HEALTH_SCALE_MAX,
};
use crate::engine::{
    AnomalyDetector, CellCycleEngine, DoseResponseSolver, GeneticSequencer, HemodynamicsSolver,
    ImmuneDefenseSim, LongevityEstimator, RiskClassifier, DEFAULT_IMMUNE_EFFICIENCY,
};

/// Mutation recorded when the run uses a mutated p53.
pub const TP53_MUTATION: &str = "TP53_Loss_Of_Function";

const LIVER_PERFUSION: f64 = 92.0;
const HEART_CANCER_RISK: f64 = 0.1;
/// Coronary blockage (%) per unit of cardiovascular risk probability.
const BLOCKAGE_PER_CARDIO_RISK: f64 = 50.0;
/// Heart health penalty per unit of cardiovascular risk probability.
const HEART_PENALTY_PER_CARDIO_RISK: f64 = 25.0;
/// Tumor volume reported in dose comparisons.
const REFERENCE_TARGET_VOLUME_CM3: f64 = 1.0;

/// Composes the engine components into [`PatientTwin`] snapshots.
///
/// Holds no per-run state; one orchestrator serves any number of runs.
#[derive(Debug, Clone)]
pub struct SimulationOrchestrator {
    classifier: Arc<RiskClassifier>,
    detector: AnomalyDetector,
    dose: DoseResponseSolver,
    hemodynamics: HemodynamicsSolver,
    longevity: LongevityEstimator,
    sequencer: GeneticSequencer,
}

impl SimulationOrchestrator {
    #[must_use]
    pub fn new(classifier: Arc<RiskClassifier>) -> Self {
        Self {
            classifier,
            detector: AnomalyDetector::new(),
            dose: DoseResponseSolver::new(),
            hemodynamics: HemodynamicsSolver::new(),
            longevity: LongevityEstimator::new(),
            sequencer: GeneticSequencer::new(),
        }
    }

    /// Replace the anomaly detector (custom population norms).
    #[must_use]
    pub fn with_detector(mut self, detector: AnomalyDetector) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Simulate the default demo profile.
    ///
    /// # Errors
    /// See [`Self::run_for`].
    pub fn run<R: Rng>(
        &self,
        patient_id: &str,
        config: &SimulationConfig,
        biomarkers: Option<&BiomarkerSample>,
        rng: R,
    ) -> crate::Result<PatientTwin> {
        self.run_for(patient_id, &PatientProfile::default(), config, biomarkers, rng)
    }

    /// Simulate `profile` under `config`, drawing checkpoint noise from `rng`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the sample carries an unusable risk
    /// feature, and `InvalidModelOutput` if a trained classifier misbehaves.
    pub fn run_for<R: Rng>(
        &self,
        patient_id: &str,
        profile: &PatientProfile,
        config: &SimulationConfig,
        biomarkers: Option<&BiomarkerSample>,
        rng: R,
    ) -> crate::Result<PatientTwin> {
        tracing::debug!("Simulating twin {patient_id} (p53={})", config.p53_status());

        let mut cell_cycle = CellCycleEngine::new(config.p53_status(), rng);
        let mitosis = cell_cycle.simulate_mitosis(config.time_steps(), config.cellular_stress())?;
        let mut log = mitosis.log;

        if config.radiation_dose_gy() > 0.0 {
            log.push(self.radiotherapy_entry(config)?);
        }

        let mut risk = None;
        if let Some(sample) = biomarkers {
            let anomalies = self.detector.detect(sample);
            let critical = anomalies
                .iter()
                .filter(|a| a.severity == Severity::Critical)
                .count();
            log.push(format!(
                "Biomarkers: {} anomalies ({critical} critical)",
                anomalies.len()
            ));

            if let Some(features) = extract_features(sample, profile.age)? {
                let vector = self.classifier.predict(&features)?;
                let dominant = vector.dominant();
                log.push(format!(
                    "Risk: {dominant} ({:.2})",
                    vector.get(dominant)
                ));
                risk = Some(vector);
            } else {
                tracing::debug!("Sample lacks risk features; classifier skipped");
            }
        }

        let battle = ImmuneDefenseSim::default().run_battle(DEFAULT_IMMUNE_EFFICIENCY)?;
        log.push(format!(
            "Immune: {} ({} pathogens)",
            battle.status, battle.remaining_pathogens
        ));

        let heart = self.heart_stats(risk.as_ref())?;
        let liver = OrganStats::new(
            "Liver",
            mitosis.cancer_risk_score,
            LIVER_PERFUSION,
            mitosis.cancer_risk_score,
        );

        let longevity = self.longevity.predict(profile.age, &profile.risk_factors);
        let mut mutations = BTreeSet::new();
        if config.p53_status() == P53Status::Mutated {
            mutations.insert(TP53_MUTATION.to_string());
        }
        let genetics =
            self.sequencer
                .profile(&profile.dna_sequence, mutations, longevity.biological_age);

        tracing::info!(
            "Twin assembled: divisions={}, cancer_risk={:.2}, classified={}",
            mitosis.divisions,
            mitosis.cancer_risk_score,
            risk.is_some()
        );

        Ok(PatientTwin::assemble(
            patient_id,
            profile,
            [heart, liver],
            genetics,
            log,
        ))
    }

    fn radiotherapy_entry(&self, config: &SimulationConfig) -> crate::Result<String> {
        let dose = config.radiation_dose_gy();
        let survival = self
            .dose
            .survival_fraction(dose, true, config.oxygen_level())?;
        let comparison = self.dose.compare_dose(REFERENCE_TARGET_VOLUME_CM3, dose)?;
        Ok(format!(
            "RT: {dose} Gy -> tumor survival {survival:.4}, therapeutic ratio {}",
            comparison.therapeutic_ratio
        ))
    }

    fn heart_stats(&self, risk: Option<&RiskVector>) -> crate::Result<OrganStats> {
        let cardio = risk.map_or(0.0, |r| r.get(RiskLabel::CardiovascularRisk));
        let report = self
            .hemodynamics
            .arterial_blockage(BLOCKAGE_PER_CARDIO_RISK * cardio)?;

        let health = HEALTH_SCALE_MAX
            - report.flow_reduction_pct / 2.0
            - HEART_PENALTY_PER_CARDIO_RISK * cardio;
        Ok(OrganStats::new(
            "Heart",
            health,
            HEALTH_SCALE_MAX - report.flow_reduction_pct,
            HEART_CANCER_RISK,
        ))
    }
}

/// Classifier input from a sample, or `None` if any feature key is missing.
fn extract_features(sample: &BiomarkerSample, age: u32) -> crate::Result<Option<RiskFeatures>> {
    let mut values = [0.0; RiskFeatures::LEN];
    values[0] = f64::from(age);
    for (slot, key) in values[1..].iter_mut().zip(RiskFeatures::SAMPLE_KEYS) {
        match sample.get(key) {
            Some(v) => *slot = v,
            None => return Ok(None),
        }
    }
    RiskFeatures::from_array(values).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SIMULATION_LOG_CAP;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn orchestrator() -> SimulationOrchestrator {
        SimulationOrchestrator::new(Arc::new(RiskClassifier::Heuristic))
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn cardio_sample() -> BiomarkerSample {
        BiomarkerSample::new()
            .with("hemoglobin", 24.5)
            .with("bmi", 22.0)
            .with("systolic_bp", 150.0)
            .with("glucose", 80.0)
            .with("cholesterol", 200.0)
            .with("smoker", 1.0)
    }

    #[test]
    fn test_default_run_shape() {
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.75, 50).unwrap();
        let twin = orchestrator().run("demo-patient", &config, None, rng(1)).unwrap();

        assert_eq!(twin.id(), "demo-patient");
        assert_eq!(twin.age(), 34);
        assert_eq!(twin.biological_sex(), "Female");
        assert_eq!(twin.simulation_log().len(), SIMULATION_LOG_CAP);
        assert!(twin.simulation_log()[4].starts_with("Immune: Active Infection"));

        let liver = twin.organ("Liver").unwrap();
        assert_eq!(liver.health_index(), liver.cancer_risk_score());
        assert_eq!(liver.blood_perfusion(), 92.0);

        let heart = twin.organ("Heart").unwrap();
        assert_eq!(heart.health_index(), 100.0);
        assert_eq!(heart.blood_perfusion(), 100.0);

        assert_eq!(twin.genetics().dna_snippet, "ATCG...");
        assert_eq!(twin.genetics().epigenetic_age, 34.0);
        assert!(twin.genetics().detected_mutations.is_empty());
    }

    #[test]
    fn test_mutated_p53_divides_unchecked() {
        let config = SimulationConfig::unirradiated(P53Status::Mutated, 0.75, 40).unwrap();
        let twin = orchestrator().run("p", &config, None, rng(3)).unwrap();

        let liver = twin.organ("Liver").unwrap();
        assert_eq!(liver.cancer_risk_score(), 25.0);
        assert!(twin.genetics().detected_mutations.contains(TP53_MUTATION));
    }

    #[test]
    fn test_biomarkers_feed_heart_and_log() {
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.5, 20).unwrap();
        let twin = orchestrator()
            .run("p", &config, Some(&cardio_sample()), rng(5))
            .unwrap();

        let report = HemodynamicsSolver::new().arterial_blockage(30.0).unwrap();
        let heart = twin.organ("Heart").unwrap();
        assert_eq!(heart.blood_perfusion(), 100.0 - report.flow_reduction_pct);
        assert_eq!(
            heart.health_index(),
            100.0 - report.flow_reduction_pct / 2.0 - 25.0 * 0.6
        );

        let log = twin.simulation_log();
        assert!(log.contains(&"Biomarkers: 1 anomalies (1 critical)".to_string()));
        assert!(log.contains(&"Risk: Cardiovascular_Risk (0.60)".to_string()));
    }

    #[test]
    fn test_missing_risk_keys_skip_classifier() {
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.5, 20).unwrap();
        let sample = BiomarkerSample::new().with("systolic_bp", 190.0);
        let twin = orchestrator().run("p", &config, Some(&sample), rng(5)).unwrap();

        assert!(twin.simulation_log().iter().all(|e| !e.starts_with("Risk:")));
        assert_eq!(twin.organ("Heart").unwrap().health_index(), 100.0);
    }

    #[test]
    fn test_bad_smoker_flag_rejected() {
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.5, 20).unwrap();
        let mut sample = cardio_sample();
        sample.insert("smoker", 0.5);
        assert!(orchestrator().run("p", &config, Some(&sample), rng(5)).is_err());
    }

    #[test]
    fn test_radiation_logged() {
        let config = SimulationConfig::new(P53Status::Functional, 0.5, 20, 10.0, 0.4).unwrap();
        let twin = orchestrator().run("p", &config, None, rng(9)).unwrap();
        assert!(twin.simulation_log().iter().any(|e| e.starts_with("RT: 10 Gy")));
    }

    #[test]
    fn test_profile_drives_genetics() {
        let profile = PatientProfile {
            age: 50,
            biological_sex: "Male".to_string(),
            dna_sequence: "brca1ATCGATCGATCG".to_string(),
            risk_factors: vec!["smoker".to_string()],
        };
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.5, 10).unwrap();
        let twin = orchestrator()
            .run_for("p", &profile, &config, None, rng(2))
            .unwrap();

        assert_eq!(twin.age(), 50);
        assert_eq!(twin.genetics().epigenetic_age, 55.3);
        assert_eq!(twin.genetics().dna_snippet, "BRCA1ATCGATC...");
        assert!(twin
            .genetics()
            .detected_mutations
            .contains("Breast Cancer Risk"));
    }

    #[test]
    fn test_same_seed_same_twin() {
        let config = SimulationConfig::unirradiated(P53Status::Functional, 0.75, 50).unwrap();
        let o = orchestrator();
        let a = o.run("p", &config, None, rng(11)).unwrap();
        let b = o.run("p", &config, None, rng(11)).unwrap();
        assert_eq!(a, b);
    }
}
