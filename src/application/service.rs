//! BioTwin service: Entry point for simulation and analysis use cases.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{SimulationOrchestrator, VitalsStream, VitalsStreamHandle};
use crate::adapters::load_risk_classifier;
use crate::config::Settings;
use crate::domain::{
    Anomaly, BiomarkerSample, P53Status, PatientProfile, PatientTwin, RiskFeatures, RiskVector,
    SimulationConfig,
};
use crate::engine::{
    AnomalyDetector, BlockageReport, DoseComparison, DoseResponseSolver, HemodynamicsSolver,
    IsotopeDecayCalculator, LongevityEstimator, LongevityResult, RiskClassifier,
};
use crate::ports::VitalsSensor;

/// Service exposing the simulation core.
///
/// Cheap to share behind an `Arc`: the classifier is immutable and every
/// run gets its own cell-cycle engine and RNG.
pub struct BioTwinService {
    settings: Settings,
    classifier: Arc<RiskClassifier>,
    orchestrator: SimulationOrchestrator,
    detector: AnomalyDetector,
    dose: DoseResponseSolver,
    hemodynamics: HemodynamicsSolver,
    isotopes: IsotopeDecayCalculator,
    longevity: LongevityEstimator,
}

impl BioTwinService {
    /// Build the service, loading the risk model from `settings.model_dir`.
    ///
    /// # Errors
    /// Returns `ModelArtifact` if an artifact is present but invalid.
    pub fn from_settings(settings: Settings) -> crate::Result<Self> {
        tracing::info!("Initializing BioTwin service (models: {:?})", settings.model_dir);
        let classifier = load_risk_classifier(&settings.model_dir)?;
        Ok(Self::new(classifier, settings))
    }

    /// Build the service around an already constructed classifier.
    #[must_use]
    pub fn new(classifier: RiskClassifier, settings: Settings) -> Self {
        let classifier = Arc::new(classifier);
        Self {
            orchestrator: SimulationOrchestrator::new(Arc::clone(&classifier)),
            classifier,
            settings,
            detector: AnomalyDetector::new(),
            dose: DoseResponseSolver::new(),
            hemodynamics: HemodynamicsSolver::new(),
            isotopes: IsotopeDecayCalculator::new(),
            longevity: LongevityEstimator::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Unirradiated config with the configured stress and step count.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the settings hold out-of-range values.
    pub fn default_config(&self, p53_status: P53Status) -> crate::Result<SimulationConfig> {
        SimulationConfig::unirradiated(
            p53_status,
            self.settings.cellular_stress,
            i64::from(self.settings.time_steps),
        )
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Simulate the default profile without biomarkers.
    ///
    /// # Errors
    /// Propagates orchestrator failures.
    pub fn run_simulation(
        &self,
        patient_id: &str,
        config: &SimulationConfig,
    ) -> crate::Result<PatientTwin> {
        tracing::info!("Initiating simulation for patient {patient_id}");
        self.orchestrator.run(patient_id, config, None, self.rng())
    }

    /// Simulate an explicit profile, optionally with a biomarker sample.
    ///
    /// # Errors
    /// Propagates orchestrator failures.
    pub fn run_simulation_with(
        &self,
        patient_id: &str,
        profile: &PatientProfile,
        config: &SimulationConfig,
        biomarkers: Option<&BiomarkerSample>,
    ) -> crate::Result<PatientTwin> {
        tracing::info!("Initiating simulation for patient {patient_id}");
        self.orchestrator
            .run_for(patient_id, profile, config, biomarkers, self.rng())
    }

    /// Classify `[age, bmi, systolic_bp, glucose, cholesterol, smoker]`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a malformed vector and
    /// `InvalidModelOutput` if the trained model misbehaves.
    pub fn assess_risk(&self, vector: [f64; 6]) -> crate::Result<RiskVector> {
        let features = RiskFeatures::from_array(vector)?;
        self.classifier.predict(&features)
    }

    #[must_use]
    pub fn detect_anomalies(&self, sample: &BiomarkerSample) -> Vec<Anomaly> {
        self.detector.detect(sample)
    }

    pub fn estimate_lifespan<I, S>(&self, age: u32, risk_factors: I) -> LongevityResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.longevity.predict(age, risk_factors)
    }

    /// Surviving cell fraction after `dose_gy`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for out-of-range inputs.
    pub fn dose_response(
        &self,
        dose_gy: f64,
        is_tumor: bool,
        oxygen_level: f64,
    ) -> crate::Result<f64> {
        self.dose.survival_fraction(dose_gy, is_tumor, oxygen_level)
    }

    /// Tumor versus healthy tissue at `dose_gy`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for out-of-range inputs.
    pub fn compare_dose(&self, target_volume_cm3: f64, dose_gy: f64) -> crate::Result<DoseComparison> {
        self.dose.compare_dose(target_volume_cm3, dose_gy)
    }

    /// Coronary flow loss at `blockage_pct`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a blockage outside `[0, 100]`.
    pub fn arterial_blockage(&self, blockage_pct: f64) -> crate::Result<BlockageReport> {
        self.hemodynamics.arterial_blockage(blockage_pct)
    }

    /// Remaining activity of `isotope` after `days`.
    ///
    /// # Errors
    /// Returns `UnknownIsotope` or `InvalidArgument`.
    pub fn decay(&self, isotope: &str, initial_activity_bq: f64, days: f64) -> crate::Result<f64> {
        self.isotopes
            .remaining_activity(isotope, initial_activity_bq, days)
    }

    /// Stream readings from `sensor` at the configured interval.
    pub fn stream_vitals<S>(&self, sensor: S) -> VitalsStreamHandle
    where
        S: VitalsSensor + 'static,
    {
        self.stream_vitals_every(sensor, self.settings.vitals_interval)
    }

    /// Stream readings from `sensor` every `interval`.
    pub fn stream_vitals_every<S>(&self, sensor: S, interval: Duration) -> VitalsStreamHandle
    where
        S: VitalsSensor + 'static,
    {
        VitalsStream::spawn(sensor, interval)
    }
}
