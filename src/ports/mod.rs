//! Ports layer: Trait definitions for pluggable collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the simulation core and external systems (trained model
//! artifacts, wearable devices).

mod risk_model;
mod vitals;

pub use risk_model::RiskModel;
pub use vitals::VitalsSensor;
