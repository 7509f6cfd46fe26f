//! Digital-twin snapshot types.
//!
//! Wire shape (JSON):
//! `{id, age, biological_sex, organs: {name: {name, health_index, blood_perfusion,
//! cancer_risk_score}}, genetics: {dna_snippet, detected_mutations, epigenetic_age},
//! simulation_log}`

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Upper bound of the organ health and cancer-risk scales.
pub const HEALTH_SCALE_MAX: f64 = 100.0;

/// Maximum number of simulation log entries kept on a twin (most recent last).
pub const SIMULATION_LOG_CAP: usize = 5;

fn clamp_scale(organ: &str, field: &str, value: f64) -> f64 {
    if value.is_nan() {
        tracing::warn!("{organ}.{field} is NaN, clamping to 0");
        return 0.0;
    }
    if !(0.0..=HEALTH_SCALE_MAX).contains(&value) {
        let clamped = value.clamp(0.0, HEALTH_SCALE_MAX);
        tracing::warn!("{organ}.{field} {value} outside [0, 100], clamped to {clamped}");
        return clamped;
    }
    value
}

/// Per-organ health summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOrganStats")]
pub struct OrganStats {
    name: String,
    health_index: f64,
    blood_perfusion: f64,
    cancer_risk_score: f64,
}

#[derive(Deserialize)]
struct RawOrganStats {
    name: String,
    health_index: f64,
    blood_perfusion: f64,
    cancer_risk_score: f64,
}

impl From<RawOrganStats> for OrganStats {
    fn from(raw: RawOrganStats) -> Self {
        Self::new(
            raw.name,
            raw.health_index,
            raw.blood_perfusion,
            raw.cancer_risk_score,
        )
    }
}

impl OrganStats {
    /// Create organ stats; out-of-range scores are clamped into `[0, 100]`
    /// with a warning.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        health_index: f64,
        blood_perfusion: f64,
        cancer_risk_score: f64,
    ) -> Self {
        let name = name.into();
        let health_index = clamp_scale(&name, "health_index", health_index);
        let cancer_risk_score = clamp_scale(&name, "cancer_risk_score", cancer_risk_score);
        Self {
            name,
            health_index,
            blood_perfusion,
            cancer_risk_score,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn health_index(&self) -> f64 {
        self.health_index
    }

    #[must_use]
    pub fn blood_perfusion(&self) -> f64 {
        self.blood_perfusion
    }

    #[must_use]
    pub fn cancer_risk_score(&self) -> f64 {
        self.cancer_risk_score
    }
}

/// Genetic summary derived from a DNA sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticProfile {
    /// Short prefix of the sequence, never the full read
    pub dna_snippet: String,
    pub detected_mutations: BTreeSet<String>,
    pub epigenetic_age: f64,
}

/// Static patient attributes supplied alongside a simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u32,
    pub biological_sex: String,
    /// Raw nucleotide sequence (A, T, C, G, N)
    pub dna_sequence: String,
    /// Lifestyle factors understood by the longevity estimator
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            age: 34,
            biological_sex: "Female".to_string(),
            dna_sequence: "ATCG".to_string(),
            risk_factors: Vec::new(),
        }
    }
}

/// Immutable digital-twin snapshot produced by one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientTwin {
    id: String,
    age: u32,
    biological_sex: String,
    organs: BTreeMap<String, OrganStats>,
    genetics: GeneticProfile,
    simulation_log: Vec<String>,
}

impl PatientTwin {
    /// Assemble a twin, keeping only the last [`SIMULATION_LOG_CAP`] log entries.
    #[must_use]
    pub fn assemble(
        id: impl Into<String>,
        profile: &PatientProfile,
        organs: impl IntoIterator<Item = OrganStats>,
        genetics: GeneticProfile,
        mut simulation_log: Vec<String>,
    ) -> Self {
        if simulation_log.len() > SIMULATION_LOG_CAP {
            let excess = simulation_log.len() - SIMULATION_LOG_CAP;
            simulation_log.drain(..excess);
        }

        Self {
            id: id.into(),
            age: profile.age,
            biological_sex: profile.biological_sex.clone(),
            organs: organs
                .into_iter()
                .map(|o| (o.name().to_string(), o))
                .collect(),
            genetics,
            simulation_log,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn biological_sex(&self) -> &str {
        &self.biological_sex
    }

    #[must_use]
    pub fn organs(&self) -> &BTreeMap<String, OrganStats> {
        &self.organs
    }

    #[must_use]
    pub fn organ(&self, name: &str) -> Option<&OrganStats> {
        self.organs.get(name)
    }

    #[must_use]
    pub fn genetics(&self) -> &GeneticProfile {
        &self.genetics
    }

    #[must_use]
    pub fn simulation_log(&self) -> &[String] {
        &self.simulation_log
    }
}
