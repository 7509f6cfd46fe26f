//! Runtime settings loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Service-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding `risk_model.json` and its manifest
    pub model_dir: PathBuf,

    /// Fixed seed for the cell-cycle RNG; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// Default checkpoint count per run
    pub time_steps: u32,

    /// Default cellular stress in `[0, 1]`
    pub cellular_stress: f64,

    /// Delay between wearable readings
    pub vitals_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            seed: None,
            time_steps: 50,
            cellular_stress: 0.75,
            vitals_interval: Duration::from_millis(1000),
        }
    }
}

impl Settings {
    /// Load overrides from environment (best-effort).
    ///
    /// Supported:
    /// - BIOTWIN_MODEL_DIR
    /// - BIOTWIN_SEED
    /// - BIOTWIN_TIME_STEPS
    /// - BIOTWIN_CELLULAR_STRESS
    /// - BIOTWIN_VITALS_INTERVAL_MS
    ///
    /// Unparseable or out-of-range values keep the default.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("BIOTWIN_MODEL_DIR") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.model_dir = PathBuf::from(v);
            }
        }

        if let Some(v) = lookup("BIOTWIN_SEED") {
            match v.trim().parse::<u64>() {
                Ok(seed) => cfg.seed = Some(seed),
                Err(_) => tracing::warn!("Ignoring BIOTWIN_SEED={v:?}: not a u64"),
            }
        }

        if let Some(v) = lookup("BIOTWIN_TIME_STEPS") {
            if let Ok(x) = v.trim().parse::<u32>() {
                if x > 0 {
                    cfg.time_steps = x;
                }
            }
        }

        if let Some(v) = lookup("BIOTWIN_CELLULAR_STRESS") {
            if let Ok(x) = v.trim().parse::<f64>() {
                if (0.0..=1.0).contains(&x) {
                    cfg.cellular_stress = x;
                }
            }
        }

        if let Some(v) = lookup("BIOTWIN_VITALS_INTERVAL_MS") {
            if let Ok(ms) = v.trim().parse::<u64>() {
                if ms > 0 {
                    cfg.vitals_interval = Duration::from_millis(ms);
                }
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("BIOTWIN_MODEL_DIR", "/opt/biotwin/models"),
            ("BIOTWIN_SEED", "42"),
            ("BIOTWIN_TIME_STEPS", "120"),
            ("BIOTWIN_CELLULAR_STRESS", "0.3"),
            ("BIOTWIN_VITALS_INTERVAL_MS", "250"),
        ]);
        assert_eq!(s.model_dir, PathBuf::from("/opt/biotwin/models"));
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.time_steps, 120);
        assert_eq!(s.cellular_stress, 0.3);
        assert_eq!(s.vitals_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let s = settings(&[
            ("BIOTWIN_SEED", "not-a-number"),
            ("BIOTWIN_TIME_STEPS", "0"),
            ("BIOTWIN_CELLULAR_STRESS", "1.5"),
            ("BIOTWIN_VITALS_INTERVAL_MS", "-10"),
        ]);
        assert_eq!(s, Settings::default());
    }
}
