//! Risk model port: Trait for trained disease classifiers.
//!
//! This trait abstracts the model format (random-forest artifact) from the
//! risk classifier.

/// A trained multi-class disease model.
///
/// Implementations must be immutable after loading: `predict_proba` takes
/// `&self` and may be called concurrently from many simulation requests.
pub trait RiskModel: Send + Sync {
    /// Class probabilities for one feature vector.
    ///
    /// # Arguments
    /// * `features` - `[age, bmi, systolic_bp, glucose, cholesterol, smoker]`
    ///
    /// # Returns
    /// One probability per label, in `RiskLabel::ALL` order.
    ///
    /// # Errors
    /// Returns `InvalidModelOutput` if the model cannot score the input.
    fn predict_proba(&self, features: &[f64; 6]) -> crate::Result<Vec<f64>>;

    /// Stable identifier of the loaded artifact (e.g. its SHA-256 digest).
    fn fingerprint(&self) -> &str;
}
