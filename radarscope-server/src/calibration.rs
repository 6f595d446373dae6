//! Tracking reset ("calibration").
//!
//! The driver belongs to the sensor poller, so a connection handler cannot
//! reset it directly. Instead it sends a [`CalibrationRequest`] through a
//! [`Calibrator`]; the poller runs [`perform`] between poll cycles and
//! replies once the settle interval has passed. Snapshot production is
//! paused for that time, and the requesting connection waits for it.

use std::time::Duration;

use log::info;
use radarscope_core::RadarDriver;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Pause after a reset before sensor output is trusted again.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(200);

/// Outstanding requests before `calibrate()` has to wait for a slot.
const QUEUE_DEPTH: usize = 4;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Sensor poller is not running")]
    PollerGone,
}

/// A pending reset, completed by the poller.
#[derive(Debug)]
pub struct CalibrationRequest {
    reply: oneshot::Sender<()>,
}

impl CalibrationRequest {
    /// Wake up the requester.
    pub fn complete(self) {
        // The requester may have gone away (client disconnected); nothing to do then
        let _ = self.reply.send(());
    }
}

/// Handle for requesting a reset. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Calibrator {
    tx: mpsc::Sender<CalibrationRequest>,
}

/// Create a calibrator and the queue the poller drains.
pub fn calibration_channel() -> (Calibrator, mpsc::Receiver<CalibrationRequest>) {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    (Calibrator { tx }, rx)
}

impl Calibrator {
    /// Reset target tracking and wait for the sensor to settle.
    pub async fn calibrate(&self) -> Result<(), CalibrationError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(CalibrationRequest { reply })
            .await
            .map_err(|_| CalibrationError::PollerGone)?;
        done.await.map_err(|_| CalibrationError::PollerGone)
    }
}

/// Clear the driver's targets, then sleep for `settle`.
pub async fn perform<D: RadarDriver>(driver: &mut D, settle: Duration) {
    info!("Calibration started...");
    driver.reset();
    tokio::time::sleep(settle).await;
    info!("Calibration complete.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarscope_core::TargetReading;
    use tokio::time::Instant;

    struct CountingDriver {
        targets: Vec<TargetReading>,
        resets: usize,
    }

    impl RadarDriver for CountingDriver {
        fn update(&mut self) -> bool {
            false
        }

        fn targets(&self) -> &[TargetReading] {
            &self.targets
        }

        fn reset(&mut self) {
            self.targets.clear();
            self.resets += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_perform_resets_and_settles() {
        let mut driver = CountingDriver {
            targets: vec![TargetReading::new(1000, 0.0, 0)],
            resets: 0,
        };
        let start = Instant::now();
        perform(&mut driver, DEFAULT_SETTLE).await;
        assert!(start.elapsed() >= DEFAULT_SETTLE);
        assert!(driver.targets.is_empty());
        assert_eq!(driver.resets, 1);
    }

    #[tokio::test]
    async fn test_calibrate_waits_for_completion() {
        let (calibrator, mut queue) = calibration_channel();
        let worker = tokio::spawn(async move {
            let mut served = 0;
            while let Some(request) = queue.recv().await {
                served += 1;
                request.complete();
            }
            served
        });

        calibrator.calibrate().await.unwrap();
        calibrator.clone().calibrate().await.unwrap();
        drop(calibrator);
        assert_eq!(worker.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_calibrate_without_poller() {
        let (calibrator, queue) = calibration_channel();
        drop(queue);
        assert!(matches!(
            calibrator.calibrate().await,
            Err(CalibrationError::PollerGone)
        ));

        // Request accepted but dropped without a reply
        let (calibrator, mut queue) = calibration_channel();
        let worker = tokio::spawn(async move {
            let request = queue.recv().await;
            drop(request);
        });
        assert!(matches!(
            calibrator.calibrate().await,
            Err(CalibrationError::PollerGone)
        ));
        worker.await.unwrap();
    }
}
