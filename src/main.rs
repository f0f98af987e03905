// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vibration monitor daemon.
//!
//! Usage: `vibration-monitor <CONFIG>`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, fmt, reload};

use vibration_monitor::{
    AlertDispatcher, Availability, Config, Monitor, MqttPublisher, lifecycle, sensor,
};

/// Watch a vibration sensor and publish appliance start/stop alerts over MQTT
#[derive(Parser, Debug)]
#[command(name = "vibration-monitor", version, about)]
struct Args {
    /// Configuration file path
    config: Option<PathBuf>,
}

type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Installs the log subscriber at INFO; the level is raised once the
/// configuration has been read.
fn init_logging() -> LevelHandle {
    let (filter, handle) = reload::Layer::new(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
    handle
}

async fn run(path: &Path, log_level: &LevelHandle) -> vibration_monitor::Result<()> {
    let config = Config::load(path)?;

    if config.main.verbose
        && let Err(e) = log_level.modify(|level| *level = LevelFilter::DEBUG)
    {
        tracing::warn!(error = %e, "Failed to raise log level");
    }

    let publisher = MqttPublisher::from_config(&config)?;
    let (monitor, handle) = Monitor::new(
        config.thresholds(),
        AlertDispatcher::from_config(&config),
        publisher.clone(),
    );
    let watch = sensor::watch(config.main.sensor_pin, handle.edge_sender())?;

    tracing::info!(
        "Running config file {} monitoring GPIO pin {}",
        path.display(),
        watch.pin()
    );

    let availability = Availability::from_config(&config);
    if let Some(reason) =
        lifecycle::run(monitor, &availability, &publisher, lifecycle::shutdown_signal()).await
    {
        tracing::info!("Stopped on {reason}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let log_level = init_logging();
    let args = Args::parse();

    let Some(path) = args.config else {
        tracing::error!("No config file specified");
        return ExitCode::FAILURE;
    };

    match run(&path, &log_level).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
