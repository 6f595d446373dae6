//! Sensor polling task.
//!
//! Owns the radar driver. Every poll interval it asks the driver for a new
//! frame and, if there is one, publishes a fresh snapshot. Calibration
//! requests are serviced in the same loop, so the driver is only ever
//! touched from this task.

use std::time::Duration;

use log::{debug, info, trace};
use radarscope_core::{RadarDriver, SensorSnapshot};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::calibration::{self, CalibrationRequest};
use crate::store::SnapshotPublisher;

/// Time between driver polls; also the worst-case staleness of `/data`.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct SensorPoller<D> {
    driver: D,
    publisher: SnapshotPublisher,
    calibrations: mpsc::Receiver<CalibrationRequest>,
    poll_interval: Duration,
    settle: Duration,
}

impl<D: RadarDriver> SensorPoller<D> {
    pub fn new(
        driver: D,
        publisher: SnapshotPublisher,
        calibrations: mpsc::Receiver<CalibrationRequest>,
        poll_interval: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            driver,
            publisher,
            calibrations,
            poll_interval,
            settle,
        }
    }

    /// Run one poll cycle. Returns `true` if a snapshot was published.
    pub fn poll_once(&mut self) -> bool {
        if !self.driver.update() {
            trace!("No new radar data");
            return false;
        }
        let snapshot = SensorSnapshot::from_readings(self.driver.targets());
        debug!("Publishing snapshot with {} target(s)", snapshot.len());
        self.publisher.publish(snapshot);
        true
    }

    /// Poll until shutdown is requested.
    pub async fn run(
        mut self,
        subsys: SubsystemHandle,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Sensor poller started, polling every {:?}",
            self.poll_interval
        );

        let mut poll_timer = interval(self.poll_interval);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    info!("Sensor poller: shutdown requested");
                    break;
                }
                Some(request) = self.calibrations.recv() => {
                    calibration::perform(&mut self.driver, self.settle).await;
                    request.complete();
                }
                _ = poll_timer.tick() => {
                    self.poll_once();
                }
            }
        }
        Ok(())
    }
}
