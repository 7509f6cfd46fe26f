//! Simulated wearable: Implementation of VitalsSensor.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::{ActivityStatus, VitalsPacket};
use crate::ports::VitalsSensor;

const HEART_RATE_BPM: std::ops::RangeInclusive<u8> = 60..=95;
const SPO2_PERCENT: std::ops::RangeInclusive<u8> = 96..=99;

/// Wrist-worn device emitting plausible resting/walking vitals.
#[derive(Debug)]
pub struct WearableSimulator {
    device_id: String,
    rng: ChaCha20Rng,
}

impl WearableSimulator {
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Deterministic readings for replay and tests.
    #[must_use]
    pub fn seeded(device_id: impl Into<String>, seed: u64) -> Self {
        Self {
            device_id: device_id.into(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl VitalsSensor for WearableSimulator {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn read(&mut self) -> crate::Result<VitalsPacket> {
        let heart_rate_bpm = self.rng.gen_range(HEART_RATE_BPM);
        let spo2_percent = self.rng.gen_range(SPO2_PERCENT);

        Ok(VitalsPacket {
            device_id: self.device_id.clone(),
            timestamp: chrono::Utc::now(),
            heart_rate_bpm,
            spo2_percent,
            activity_status: ActivityStatus::from_heart_rate(heart_rate_bpm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_in_range() {
        let mut sensor = WearableSimulator::seeded("wrist-01", 7);
        for _ in 0..200 {
            let p = sensor.read().unwrap();
            assert!(HEART_RATE_BPM.contains(&p.heart_rate_bpm));
            assert!(SPO2_PERCENT.contains(&p.spo2_percent));
            assert_eq!(
                p.activity_status,
                ActivityStatus::from_heart_rate(p.heart_rate_bpm)
            );
            assert_eq!(p.device_id, "wrist-01");
        }
    }

    #[test]
    fn test_seeded_sequences_repeat() {
        let mut a = WearableSimulator::seeded("a", 42);
        let mut b = WearableSimulator::seeded("a", 42);
        for _ in 0..10 {
            let (pa, pb) = (a.read().unwrap(), b.read().unwrap());
            assert_eq!(pa.heart_rate_bpm, pb.heart_rate_bpm);
            assert_eq!(pa.spo2_percent, pb.spo2_percent);
        }
    }
}
