use std::time::Duration;

use clap::Parser;
use log::info;
use miette::{IntoDiagnostic, Result, WrapErr};
use radarscope_core::EmulatorDriver;
use radarscope_server::{Cli, Server, ServerConfig, VERSION};
use tokio_graceful_shutdown::Toplevel;

/// How long subsystems get to finish after Ctrl-C.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = ServerConfig::from(&args);

    // Everything runs cooperatively on this one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()
        .wrap_err("Cannot create runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> Result<()> {
    info!("radarscope {} starting", VERSION);

    let driver = EmulatorDriver::new(config.emulated_targets);
    info!("Using emulated radar with {} target(s)", driver.target_count());

    let server = Server::new(&config, driver).into_diagnostic()?;

    Toplevel::new(move |s| async move {
        server.start(&s);
    })
    .catch_signals()
    .handle_shutdown_requests(SHUTDOWN_TIMEOUT)
    .await
    .into_diagnostic()
}
