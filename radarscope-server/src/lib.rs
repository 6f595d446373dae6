//! # Radarscope Server
//!
//! Serves live radar targets to a browser.
//!
//! Two perpetual tasks share a single-threaded tokio runtime:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    radarscope-server                      │
//! │                                                           │
//! │  ┌───────────────┐  publish   ┌────────────────────────┐  │
//! │  │ SensorPoller  │──────────▶ │ SnapshotStore (watch)  │  │
//! │  │ (owns driver) │            └───────────┬────────────┘  │
//! │  └───────▲───────┘                        │ read          │
//! │          │ CalibrationRequest             ▼               │
//! │          │                     ┌────────────────────────┐ │
//! │          └─────────────────────│ Web (accept loop,      │ │
//! │                                │ one task per client)   │ │
//! │                                └────────────────────────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every wait (poll interval, calibration settle, accept, socket I/O) is an
//! `await`, so no task holds up the others for longer than it takes to
//! transform one frame or classify one request.
//!
//! ## HTTP interface
//!
//! | Request contains  | Response                               |
//! |-------------------|----------------------------------------|
//! | `GET /data`       | `application/json` current targets     |
//! | `GET /calibrate`  | `text/plain` `Calibrated.` after reset |
//! | anything else     | `text/html` display page               |
//!
//! ## Example: Starting the Server
//!
//! ```rust,no_run
//! use radarscope_core::EmulatorDriver;
//! use radarscope_server::{Server, ServerConfig};
//! use std::time::Duration;
//! use tokio_graceful_shutdown::Toplevel;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let server = Server::new(&config, EmulatorDriver::new(3)).unwrap();
//!
//!     Toplevel::new(move |s| async move {
//!         server.start(&s);
//!     })
//!     .catch_signals()
//!     .handle_shutdown_requests(Duration::from_secs(2))
//!     .await
//!     .unwrap();
//! }
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use radarscope_core::{RadarDriver, MAX_TARGETS};
use tokio::net::TcpListener;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

pub mod calibration;
pub mod poller;
pub mod store;
pub mod web;

use calibration::calibration_channel;
use poller::SensorPoller;
use web::{Web, WebError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 80;

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Port for webserver
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to listen on
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub address: IpAddr,

    /// Milliseconds between radar polls
    #[arg(long, default_value_t = poller::DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval: u64,

    /// Milliseconds to wait after a calibration reset
    #[arg(long, default_value_t = calibration::DEFAULT_SETTLE.as_millis() as u64)]
    pub settle: u64,

    /// Number of emulated targets
    #[arg(short, long, default_value_t = MAX_TARGETS as u8,
          value_parser = clap::value_parser!(u8).range(0..=MAX_TARGETS as i64))]
    pub targets: u8,

    /// Drop clients that take longer than this many milliseconds.
    /// Without it a client that never sends a request keeps its connection open.
    #[arg(long)]
    pub client_timeout: Option<u64>,
}

/// Runtime settings, resolved from [`Cli`].
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub poll_interval: Duration,
    pub settle: Duration,
    pub emulated_targets: usize,
    pub client_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            poll_interval: poller::DEFAULT_POLL_INTERVAL,
            settle: calibration::DEFAULT_SETTLE,
            emulated_targets: MAX_TARGETS,
            client_timeout: None,
        }
    }
}

impl From<&Cli> for ServerConfig {
    fn from(args: &Cli) -> Self {
        Self {
            address: SocketAddr::new(args.address, args.port),
            poll_interval: Duration::from_millis(args.poll_interval),
            settle: Duration::from_millis(args.settle),
            emulated_targets: usize::from(args.targets),
            client_timeout: args.client_timeout.map(Duration::from_millis),
        }
    }
}

/// A bound, ready-to-run server.
///
/// Creating it binds the listening socket, so startup failures surface
/// before any task is scheduled.
pub struct Server<D> {
    poller: SensorPoller<D>,
    web: Web,
    listener: TcpListener,
}

impl<D: RadarDriver + 'static> Server<D> {
    /// Bind `config.address` and wire the driver to the web front end.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &ServerConfig, driver: D) -> Result<Self, WebError> {
        let listener = web::bind(config.address)?;
        let index = web::index_document()?;

        let (publisher, reader) = store::snapshot_store();
        let (calibrator, calibrations) = calibration_channel();

        Ok(Self {
            poller: SensorPoller::new(
                driver,
                publisher,
                calibrations,
                config.poll_interval,
                config.settle,
            ),
            web: Web::new(reader, calibrator, index, config.client_timeout),
            listener,
        })
    }

    /// The address actually bound (useful when the configured port is 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Register the sensor and web subsystems.
    pub fn start(self, subsystem: &SubsystemHandle) {
        let Server {
            poller,
            web,
            listener,
        } = self;

        subsystem.start(SubsystemBuilder::new("Sensor", |subsys| poller.run(subsys)));
        subsystem.start(SubsystemBuilder::new("Web", |subsys| web.run(subsys, listener)));
    }
}
