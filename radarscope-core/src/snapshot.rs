//! Target data model
//!
//! The driver reports raw [`TargetReading`]s in sensor-native units. Every
//! time it signals new data they are converted into a [`SensorSnapshot`] of
//! display-ready [`DisplayTarget`]s, which is what the browser receives.
//!
//! ```text
//! TargetReading { distance: 4000, angle: 12.34, speed: 250 }
//!        │
//!        ▼  mm → m (2 dp), deg (1 dp), speed / 100 (2 dp)
//! DisplayTarget { range: 4.0, angle: 12.3, speed: 2.5 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One target slot as reported by the radar driver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetReading {
    /// Distance in millimetres; 0 means the slot holds no target
    pub distance: i32,
    /// Bearing in degrees, positive to the right of boresight
    pub angle: f64,
    /// Radial speed in hundredths of a metre per second (cm/s)
    pub speed: i32,
}

impl TargetReading {
    /// An unoccupied slot.
    pub const EMPTY: TargetReading = TargetReading {
        distance: 0,
        angle: 0.0,
        speed: 0,
    };

    pub fn new(distance: i32, angle: f64, speed: i32) -> Self {
        Self {
            distance,
            angle,
            speed,
        }
    }

    /// Build a reading from a position in the sensor frame.
    ///
    /// The sensor reports targets in cartesian millimetres with +y along
    /// boresight, so the bearing is `atan2(x, y)`.
    pub fn from_cartesian(x: i32, y: i32, speed: i32) -> Self {
        let (x, y) = (f64::from(x), f64::from(y));
        Self {
            distance: x.hypot(y).round() as i32,
            angle: x.atan2(y).to_degrees(),
            speed,
        }
    }

    /// True if this slot holds a target.
    pub fn is_present(&self) -> bool {
        self.distance > 0
    }
}

/// A target ready for display, in metres, degrees and metres per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTarget {
    pub range: f64,
    pub angle: f64,
    pub speed: f64,
}

impl DisplayTarget {
    /// Convert a raw reading, or `None` for an empty slot.
    pub fn from_reading(reading: &TargetReading) -> Option<Self> {
        if !reading.is_present() {
            return None;
        }
        Some(Self {
            range: round_to(f64::from(reading.distance) / 1000.0, 2),
            angle: round_to(reading.angle, 1),
            speed: round_to(f64::from(reading.speed) / 100.0, 2),
        })
    }
}

/// Round half away from zero to `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// All targets currently tracked, in driver slot order.
///
/// Empty slots are dropped rather than kept as placeholders, so the index of
/// a target is only stable while the targets before it stay tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    targets: Vec<DisplayTarget>,
}

impl SensorSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from the driver's slot list.
    pub fn from_readings(readings: &[TargetReading]) -> Self {
        Self {
            targets: readings
                .iter()
                .filter_map(DisplayTarget::from_reading)
                .collect(),
        }
    }

    pub fn targets(&self) -> &[DisplayTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Encode as `{"targets":[{"range":..,"angle":..,"speed":..},..]}`.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_transform() {
        let reading = TargetReading::new(4000, 12.34, 250);
        let target = DisplayTarget::from_reading(&reading).unwrap();
        assert_eq!(
            target,
            DisplayTarget {
                range: 4.0,
                angle: 12.3,
                speed: 2.5
            }
        );
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let target = DisplayTarget::from_reading(&TargetReading::new(1235, -7.25, -1255)).unwrap();
        assert_eq!(target.range, 1.24);
        assert_eq!(target.angle, -7.3);
        assert_eq!(target.speed, -12.55);
    }

    #[test]
    fn test_transform_is_idempotent() {
        for reading in [
            TargetReading::new(4000, 12.34, 250),
            TargetReading::new(1, -59.96, -3),
            TargetReading::new(7999, 0.05, 12345),
        ] {
            let once = DisplayTarget::from_reading(&reading).unwrap();
            let twice = DisplayTarget::from_reading(&reading).unwrap();
            assert_eq!(once, twice);
            assert_eq!(round_to(once.range, 2), once.range);
            assert_eq!(round_to(once.angle, 1), once.angle);
            assert_eq!(round_to(once.speed, 2), once.speed);
        }
    }

    #[test]
    fn test_empty_slots_dropped() {
        assert!(DisplayTarget::from_reading(&TargetReading::EMPTY).is_none());
        assert!(DisplayTarget::from_reading(&TargetReading::new(-5, 10.0, 10)).is_none());

        let snapshot = SensorSnapshot::from_readings(&[
            TargetReading::EMPTY,
            TargetReading::new(2500, -30.0, 0),
            TargetReading::new(0, 45.0, 100),
            TargetReading::new(6000, 15.0, -50),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.targets()[0].range, 2.5);
        assert_eq!(snapshot.targets()[1].range, 6.0);
    }

    #[test]
    fn test_from_cartesian() {
        let ahead = TargetReading::from_cartesian(0, 3000, 40);
        assert_eq!(ahead.distance, 3000);
        assert_eq!(ahead.angle, 0.0);
        assert_eq!(ahead.speed, 40);

        let right = TargetReading::from_cartesian(3000, 3000, 0);
        assert_eq!(right.distance, 4243);
        assert!((right.angle - 45.0).abs() < 1e-9);

        let left = TargetReading::from_cartesian(-3000, 3000, 0);
        assert!((left.angle + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(SensorSnapshot::empty().to_json().unwrap(), r#"{"targets":[]}"#);

        let snapshot = SensorSnapshot::from_readings(&[TargetReading::new(4000, 12.34, 250)]);
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"targets":[{"range":4.0,"angle":12.3,"speed":2.5}]}"#
        );
    }
}
