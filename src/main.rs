//! DriveWatch — unattended filesystem activity monitor.
//!
//! Thin binary entry point. All logic lives in the `drivewatch-core` crate:
//! this file only initialises logging, loads configuration, installs the
//! shutdown signal handler, and hands the enumerated volumes to the
//! supervisor.

use std::path::Path;

use anyhow::Context;
use crossbeam_channel::bounded;

use drivewatch_core::config::WatchConfig;
use drivewatch_core::model::Volume;
use drivewatch_core::platform;
use drivewatch_core::retention;
use drivewatch_core::supervisor::Supervisor;
use drivewatch_core::watch::{NotificationSource, NotifySource};

/// Optional configuration file looked up in the working directory.
const CONFIG_FILE: &str = "drivewatch.json";

fn main() -> anyhow::Result<()> {
    // Initialise structured logging. The fmt subscriber writes to stdout,
    // which doubles as the live mirror of every persisted record.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("DriveWatch starting");

    let config = WatchConfig::load(Path::new(CONFIG_FILE)).context("loading configuration")?;

    // Volumes are enumerated once; mounts attached later are not picked up
    // until the next start.
    let volumes: Vec<Volume> = if config.roots.is_empty() {
        platform::enumerate_volumes()
    } else {
        config.roots.iter().cloned().map(Volume::new).collect()
    };
    if volumes.is_empty() {
        anyhow::bail!("no volumes available to watch");
    }
    tracing::info!("Watching {} volume(s)", volumes.len());

    // Interrupt/termination signal triggers cooperative shutdown.
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .context("installing the shutdown handler")?;

    // The retention sweeper runs detached from the per-volume workers.
    let (sweep_stop_tx, sweep_stop_rx) = bounded::<()>(0);
    let sweeper = retention::spawn_sweeper(
        config.log_root.clone(),
        config.retention_window(),
        config.sweep_interval(),
        sweep_stop_rx,
    );

    let supervisor = Supervisor::new(config);
    supervisor.run(
        volumes,
        |_volume| Box::new(NotifySource::new()) as Box<dyn NotificationSource>,
        shutdown_rx,
    );

    drop(sweep_stop_tx);
    let _ = sweeper.join();

    tracing::info!("DriveWatch stopped cleanly");
    Ok(())
}
