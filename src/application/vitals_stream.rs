//! Background vitals streaming.
//!
//! A worker thread polls a [`VitalsSensor`] once per interval and forwards
//! packets over a channel. Between readings it blocks on the cancel channel,
//! so cancellation (or dropping the handle) wakes it immediately instead of
//! after the current interval.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::domain::VitalsPacket;
use crate::ports::VitalsSensor;
use crate::BioTwinError;

/// Handle to a running vitals stream. Dropping it stops the worker.
pub struct VitalsStreamHandle {
    packets: Receiver<VitalsPacket>,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl VitalsStreamHandle {
    /// Next packet if one is ready (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<VitalsPacket> {
        match self.packets.try_recv() {
            Ok(packet) => Some(packet),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next packet.
    ///
    /// Returns `Ok(None)` on timeout.
    ///
    /// # Errors
    /// Returns `StreamClosed` once the worker has stopped and every buffered
    /// packet has been received.
    pub fn recv_timeout(&self, timeout: Duration) -> crate::Result<Option<VitalsPacket>> {
        match self.packets.recv_timeout(timeout) {
            Ok(packet) => Ok(Some(packet)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BioTwinError::StreamClosed),
        }
    }

    /// Stop the worker and wait for it to exit. Idempotent.
    pub fn cancel(&mut self) {
        // Dropping the sender disconnects the worker's cancel receiver.
        self.cancel_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Vitals worker panicked");
            }
        }
    }

    /// True once the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for VitalsStreamHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Vitals streaming worker.
pub struct VitalsStream;

impl VitalsStream {
    /// Start streaming from `sensor`, one reading per `interval`.
    ///
    /// The first reading is taken immediately. The stream ends on cancel,
    /// when the handle is dropped, or when the sensor fails.
    pub fn spawn<S>(sensor: S, interval: Duration) -> VitalsStreamHandle
    where
        S: VitalsSensor + 'static,
    {
        let (packet_tx, packet_rx) = mpsc::channel();
        let (cancel_tx, cancel_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            Self::run(sensor, interval, &packet_tx, &cancel_rx);
        });

        VitalsStreamHandle {
            packets: packet_rx,
            cancel_tx: Some(cancel_tx),
            worker: Some(worker),
        }
    }

    fn run<S: VitalsSensor>(
        mut sensor: S,
        interval: Duration,
        packets: &Sender<VitalsPacket>,
        cancel: &Receiver<()>,
    ) {
        tracing::info!("Vitals stream started for {}", sensor.device_id());
        let mut sent = 0u64;

        loop {
            match sensor.read() {
                Ok(packet) => {
                    if packets.send(packet).is_err() {
                        tracing::debug!("Vitals consumer disconnected");
                        break;
                    }
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!("Vitals sensor {} failed: {e}", sensor.device_id());
                    break;
                }
            }

            match cancel.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::info!(
            "Vitals stream for {} stopped after {sent} packets",
            sensor.device_id()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::WearableSimulator;
    use std::time::Instant;

    struct FlakySensor {
        reads_left: u32,
        inner: WearableSimulator,
    }

    impl VitalsSensor for FlakySensor {
        fn device_id(&self) -> &str {
            "flaky"
        }

        fn read(&mut self) -> crate::Result<VitalsPacket> {
            if self.reads_left == 0 {
                return Err(BioTwinError::InvalidArgument("sensor detached".into()));
            }
            self.reads_left -= 1;
            self.inner.read()
        }
    }

    #[test]
    fn test_streams_packets() {
        let handle = VitalsStream::spawn(
            WearableSimulator::seeded("wrist-01", 1),
            Duration::from_millis(5),
        );
        for _ in 0..3 {
            let packet = handle
                .recv_timeout(Duration::from_secs(5))
                .unwrap()
                .expect("packet within timeout");
            assert_eq!(packet.device_id, "wrist-01");
        }
    }

    #[test]
    fn test_cancel_wakes_worker_promptly() {
        let mut handle = VitalsStream::spawn(
            WearableSimulator::seeded("wrist-02", 2),
            Duration::from_secs(3600),
        );
        assert!(handle
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
            .is_some());

        let started = Instant::now();
        handle.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(handle.is_finished());
        assert!(matches!(
            handle.recv_timeout(Duration::from_millis(10)),
            Err(BioTwinError::StreamClosed)
        ));
    }

    #[test]
    fn test_sensor_failure_ends_stream() {
        let handle = VitalsStream::spawn(
            FlakySensor {
                reads_left: 2,
                inner: WearableSimulator::seeded("flaky", 3),
            },
            Duration::from_millis(1),
        );

        let mut received = 0;
        loop {
            match handle.recv_timeout(Duration::from_secs(5)) {
                Ok(Some(_)) => received += 1,
                Ok(None) => panic!("stream stalled"),
                Err(e) => {
                    assert!(matches!(e, BioTwinError::StreamClosed));
                    break;
                }
            }
        }
        assert_eq!(received, 2);
    }
}
