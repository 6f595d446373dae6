//! Radar driver abstraction.
//!
//! The driver decodes the sensor's wire protocol and keeps a fixed-capacity
//! list of tracked targets. Everything above it only needs three operations,
//! expressed here as a poll-based trait so it works the same with or without
//! an async runtime.

use crate::snapshot::TargetReading;

/// Number of targets the sensor tracks concurrently.
pub const MAX_TARGETS: usize = 3;

/// A source of target readings.
pub trait RadarDriver: Send {
    /// Check for a new frame.
    ///
    /// Must not block. Returns `true` if [`RadarDriver::targets`] now holds
    /// data that was not there before; `false` simply means nothing arrived
    /// yet and is not an error.
    fn update(&mut self) -> bool;

    /// The current target slots, in the driver's native order.
    ///
    /// Empty slots are reported with a distance of zero.
    fn targets(&self) -> &[TargetReading];

    /// Discard all tracked targets.
    fn reset(&mut self);
}

impl<D: RadarDriver + ?Sized> RadarDriver for Box<D> {
    fn update(&mut self) -> bool {
        (**self).update()
    }

    fn targets(&self) -> &[TargetReading] {
        (**self).targets()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
