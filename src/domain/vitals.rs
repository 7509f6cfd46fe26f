//! Live vitals packets produced by a wearable sensor.

use serde::{Deserialize, Serialize};

/// Coarse activity classification derived from heart rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    Resting,
    Walking,
}

impl ActivityStatus {
    /// Heart rate above which the wearer is considered walking.
    pub const WALKING_THRESHOLD_BPM: u8 = 85;

    #[must_use]
    pub fn from_heart_rate(bpm: u8) -> Self {
        if bpm > Self::WALKING_THRESHOLD_BPM {
            Self::Walking
        } else {
            Self::Resting
        }
    }
}

/// One vitals reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsPacket {
    pub device_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub heart_rate_bpm: u8,
    pub spo2_percent: u8,
    pub activity_status: ActivityStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_threshold() {
        assert_eq!(ActivityStatus::from_heart_rate(85), ActivityStatus::Resting);
        assert_eq!(ActivityStatus::from_heart_rate(86), ActivityStatus::Walking);
    }
}
