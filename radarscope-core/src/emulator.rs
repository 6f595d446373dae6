//! Emulated radar driver.
//!
//! Simulates a handful of people walking through the sensor's field of view
//! so the server and display can run without hardware attached. Targets move
//! at constant velocity and bounce off the edges of the detection zone
//! (±60°, 0.2 m to 8 m).

use std::time::{Duration, Instant};

use crate::driver::{RadarDriver, MAX_TARGETS};
use crate::snapshot::TargetReading;

/// Time between frames, matching the sensor's update rate.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// After a reset, frames report no targets for this long.
pub const REACQUIRE_DELAY: Duration = Duration::from_secs(1);

const MIN_RANGE_MM: f64 = 200.0;
const MAX_RANGE_MM: f64 = 8000.0;
const MAX_ANGLE_DEG: f64 = 60.0;

/// Simulated target in the sensor frame: millimetres and mm/s, +y is boresight.
#[derive(Debug, Clone, Copy)]
struct Track {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

const INITIAL_TRACKS: [Track; MAX_TARGETS] = [
    Track {
        x: -1500.0,
        y: 3000.0,
        vx: 300.0,
        vy: -100.0,
    },
    Track {
        x: 1000.0,
        y: 5000.0,
        vx: -200.0,
        vy: 150.0,
    },
    Track {
        x: 0.0,
        y: 1500.0,
        vx: 100.0,
        vy: 250.0,
    },
];

impl Track {
    fn in_zone(x: f64, y: f64) -> bool {
        let range = x.hypot(y);
        let angle = x.atan2(y).to_degrees();
        (MIN_RANGE_MM..=MAX_RANGE_MM).contains(&range) && angle.abs() <= MAX_ANGLE_DEG
    }

    fn step(&mut self, dt: f64) {
        let (x, y) = (self.x + self.vx * dt, self.y + self.vy * dt);
        if Self::in_zone(x, y) {
            self.x = x;
            self.y = y;
        } else {
            self.vx = -self.vx;
            self.vy = -self.vy;
        }
    }

    fn reading(&self) -> TargetReading {
        let range = self.x.hypot(self.y);
        // Radial component of velocity, mm/s -> cm/s
        let radial = if range > 0.0 {
            (self.x * self.vx + self.y * self.vy) / range
        } else {
            0.0
        };
        TargetReading::from_cartesian(
            self.x.round() as i32,
            self.y.round() as i32,
            (radial / 10.0).round() as i32,
        )
    }
}

/// A [`RadarDriver`] producing synthetic targets.
#[derive(Debug)]
pub struct EmulatorDriver {
    tracks: Vec<Track>,
    slots: [TargetReading; MAX_TARGETS],
    frame_interval: Duration,
    last_frame: Option<Duration>,
    reset_pending: bool,
    reacquire_at: Option<Duration>,
    epoch: Instant,
}

impl EmulatorDriver {
    /// Create an emulator simulating `targets` targets (at most [`MAX_TARGETS`]).
    pub fn new(targets: usize) -> Self {
        Self {
            tracks: INITIAL_TRACKS[..targets.min(MAX_TARGETS)].to_vec(),
            slots: [TargetReading::EMPTY; MAX_TARGETS],
            frame_interval: DEFAULT_FRAME_INTERVAL,
            last_frame: None,
            reset_pending: false,
            reacquire_at: None,
            epoch: Instant::now(),
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Number of simulated targets.
    pub fn target_count(&self) -> usize {
        self.tracks.len()
    }

    /// Advance the simulation to `now` (time since the emulator started).
    ///
    /// Returns `true` if a new frame was produced.
    pub fn update_at(&mut self, now: Duration) -> bool {
        let dt = match self.last_frame {
            Some(last) if now < last + self.frame_interval => return false,
            Some(last) => now - last,
            None => Duration::ZERO,
        };
        self.last_frame = Some(now);

        for track in self.tracks.iter_mut() {
            track.step(dt.as_secs_f64());
        }

        if self.reset_pending {
            self.reset_pending = false;
            self.reacquire_at = Some(now + REACQUIRE_DELAY);
        }
        self.slots = [TargetReading::EMPTY; MAX_TARGETS];
        match self.reacquire_at {
            Some(at) if now < at => {}
            _ => {
                self.reacquire_at = None;
                for (slot, track) in self.slots.iter_mut().zip(self.tracks.iter()) {
                    *slot = track.reading();
                }
            }
        }
        true
    }
}

impl RadarDriver for EmulatorDriver {
    fn update(&mut self) -> bool {
        let now = self.epoch.elapsed();
        self.update_at(now)
    }

    fn targets(&self) -> &[TargetReading] {
        &self.slots
    }

    fn reset(&mut self) {
        self.slots = [TargetReading::EMPTY; MAX_TARGETS];
        self.reset_pending = true;
    }
}
