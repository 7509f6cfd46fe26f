//! # BioTwin
//!
//! Patient digital-twin simulation core.
//!
//! Turns a small set of clinical inputs (cellular stress, radiation dose,
//! biomarker values, lifestyle risk factors) into a structured [`PatientTwin`]
//! snapshot: per-organ health indices, a cancer-risk score from a stochastic
//! cell-cycle model, a disease-probability vector and a longevity estimate.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (SimulationConfig, BiomarkerSample, PatientTwin, ...)
//! - `engine`: Pure solvers and models (cell cycle, LQ dose response, decay,
//!   Poiseuille flow, anomaly detection, risk classification, longevity)
//! - `ports`: Trait definitions for pluggable collaborators (trained risk
//!   model, vitals sensor)
//! - `adapters`: Concrete implementations (random-forest artifact, simulated
//!   wearable, log sanitization)
//! - `application`: Use cases orchestrating the engine into twin snapshots
//! - `config`: Environment-driven runtime settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;

pub use application::{BioTwinService, SimulationOrchestrator};
pub use domain::{BiomarkerSample, PatientTwin, RiskVector, SimulationConfig};

/// Result type for BioTwin operations
pub type Result<T> = std::result::Result<T, BioTwinError>;

/// Main error type for BioTwin
#[derive(Debug, thiserror::Error)]
pub enum BioTwinError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown isotope: {0}")]
    UnknownIsotope(String),

    #[error("Model artifact error: {0}")]
    ModelArtifact(String),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Vitals stream closed")]
    StreamClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
