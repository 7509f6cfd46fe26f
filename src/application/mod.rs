//! Application layer: Use cases and services.
//!
//! This module orchestrates the engine and ports to implement the
//! core use cases: twin simulation, point analyses and vitals streaming.

mod service;
mod simulation;
mod vitals_stream;

pub use service::BioTwinService;
pub use simulation::{SimulationOrchestrator, TP53_MUTATION};
pub use vitals_stream::{VitalsStream, VitalsStreamHandle};
