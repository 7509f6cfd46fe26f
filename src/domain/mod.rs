//! Domain layer: Core simulation types.
//!
//! This module contains plain data types with validation and no I/O.
//! All types are serializable and enforce their own range invariants.

mod biomarker;
mod risk;
mod simulation;
mod twin;
mod vitals;

pub use biomarker::{Anomaly, BiomarkerSample, Severity};
pub use risk::{RiskFeatures, RiskLabel, RiskVector};
pub use simulation::{CellCycleState, CellPhase, MitosisOutcome, P53Status, SimulationConfig};
pub use twin::{
    GeneticProfile, OrganStats, PatientProfile, PatientTwin, HEALTH_SCALE_MAX,
    SIMULATION_LOG_CAP,
};
pub use vitals::{ActivityStatus, VitalsPacket};
