//! Vitals sensor port: Trait for live wearable readings.

use crate::domain::VitalsPacket;

/// A source of vitals readings, polled once per stream interval.
///
/// Implementations are moved onto the streaming thread, hence `Send`.
pub trait VitalsSensor: Send {
    /// Identifier of the physical or simulated device.
    fn device_id(&self) -> &str;

    /// Take one reading.
    ///
    /// # Errors
    /// Returns an error if the device can no longer be read; the stream ends.
    fn read(&mut self) -> crate::Result<VitalsPacket>;
}
