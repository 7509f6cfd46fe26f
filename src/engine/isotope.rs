//! Radioactive decay: `A(t) = A0 · 0.5^(t / half_life)`.

use super::{require_finite, round_to};
use crate::BioTwinError;

/// Supported isotopes and their half-lives in days.
const HALF_LIVES_DAYS: [(&str, f64); 3] = [
    ("Iodine-131", 8.02),
    ("Cobalt-60", 1925.28),
    ("Technetium-99m", 0.25),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct IsotopeDecayCalculator;

impl IsotopeDecayCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Names of all isotopes in the table.
    pub fn isotopes(&self) -> impl Iterator<Item = &'static str> {
        HALF_LIVES_DAYS.iter().map(|(name, _)| *name)
    }

    /// Half-life of `isotope` in days.
    ///
    /// # Errors
    /// Returns `UnknownIsotope` if the name is not in the table.
    pub fn half_life_days(&self, isotope: &str) -> crate::Result<f64> {
        HALF_LIVES_DAYS
            .iter()
            .find(|(name, _)| *name == isotope)
            .map(|(_, half_life)| *half_life)
            .ok_or_else(|| BioTwinError::UnknownIsotope(isotope.to_string()))
    }

    /// Remaining activity in Bq after `days_elapsed`, rounded to 4 decimals.
    ///
    /// # Errors
    /// Returns `UnknownIsotope` for names outside the table and
    /// `InvalidArgument` for negative or non-finite inputs.
    pub fn remaining_activity(
        &self,
        isotope: &str,
        initial_activity_bq: f64,
        days_elapsed: f64,
    ) -> crate::Result<f64> {
        let half_life = self.half_life_days(isotope)?;

        require_finite("initial_activity_bq", initial_activity_bq)?;
        require_finite("days_elapsed", days_elapsed)?;
        if initial_activity_bq < 0.0 || days_elapsed < 0.0 {
            return Err(BioTwinError::InvalidArgument(format!(
                "activity ({initial_activity_bq}) and elapsed days ({days_elapsed}) must be >= 0"
            )));
        }

        let decay_factor = 0.5f64.powf(days_elapsed / half_life);
        Ok(round_to(initial_activity_bq * decay_factor, 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_half_lives_quarter_activity() {
        let calc = IsotopeDecayCalculator::new();
        let remaining = calc
            .remaining_activity("Iodine-131", 5000.0, 2.0 * 8.02)
            .unwrap();
        assert!((remaining - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_sixteen_days_iodine() {
        // 16 days is slightly under two 8.02-day half-lives.
        let calc = IsotopeDecayCalculator::new();
        let remaining = calc.remaining_activity("Iodine-131", 5000.0, 16.0).unwrap();
        let expected = 5000.0 * 0.5f64.powf(16.0 / 8.02);
        assert!((remaining - expected).abs() < 1e-4);
        assert!(remaining > 1250.0 && remaining < 1255.0);
    }

    #[test]
    fn test_zero_days_keeps_activity() {
        let calc = IsotopeDecayCalculator::new();
        assert_eq!(
            calc.remaining_activity("Cobalt-60", 740.0, 0.0).unwrap(),
            740.0
        );
    }

    #[test]
    fn test_unknown_isotope() {
        let calc = IsotopeDecayCalculator::new();
        let err = calc
            .remaining_activity("Unknown-1", 100.0, 5.0)
            .expect_err("Must fail");
        assert!(matches!(err, BioTwinError::UnknownIsotope(name) if name == "Unknown-1"));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let calc = IsotopeDecayCalculator::new();
        assert!(calc.remaining_activity("Technetium-99m", -1.0, 1.0).is_err());
        assert!(calc.remaining_activity("Technetium-99m", 1.0, -1.0).is_err());
    }

    #[test]
    fn test_table_lookup() {
        let calc = IsotopeDecayCalculator::new();
        assert_eq!(calc.isotopes().count(), 3);
        assert_eq!(calc.half_life_days("Technetium-99m").unwrap(), 0.25);
    }
}
