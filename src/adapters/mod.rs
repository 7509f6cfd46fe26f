//! Adapters layer: Concrete implementations of ports.
//!
//! - `forest`: JSON random-forest risk model with manifest verification
//! - `wearable`: simulated vitals sensor
//! - `sanitize`: redaction of identifiers in log output

pub mod forest;
pub mod sanitize;
pub mod wearable;

pub use forest::{load_risk_classifier, ForestModel, ModelManifest};
pub use wearable::WearableSimulator;
