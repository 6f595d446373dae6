//! # Radarscope Core
//!
//! Platform-independent part of radarscope: the target data model, the
//! radar driver abstraction and the tiny HTTP request/response layer.
//!
//! This crate has **no I/O and no async dependencies**. The server crate
//! provides the runtime, sockets and scheduling on top of it.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  radarscope-core                                       │
//! │  ├── driver    (RadarDriver trait, poll-based)         │
//! │  ├── emulator  (synthetic targets, no hardware needed) │
//! │  ├── snapshot  (TargetReading -> SensorSnapshot)       │
//! │  └── http      (Route classification, Response)        │
//! └────────────────────────────────────────────────────────┘
//!                         ▲
//!            ┌────────────┴────────────┐
//!            │  radarscope-server      │
//!            │  (tokio, single thread) │
//!            └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use radarscope_core::{Route, SensorSnapshot, TargetReading};
//!
//! let snapshot = SensorSnapshot::from_readings(&[
//!     TargetReading::new(4000, 12.34, 250),
//!     TargetReading::EMPTY,
//! ]);
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(Route::classify(b"GET /data HTTP/1.0\r\n\r\n"), Route::Data);
//! ```

pub mod driver;
pub mod emulator;
pub mod error;
pub mod http;
pub mod snapshot;

pub use driver::{RadarDriver, MAX_TARGETS};
pub use emulator::EmulatorDriver;
pub use error::CoreError;
pub use http::{ContentType, Response, Route, MAX_REQUEST_BYTES};
pub use snapshot::{DisplayTarget, SensorSnapshot, TargetReading};
