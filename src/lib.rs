// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vibration Monitor - appliance start/stop alerts from a vibration sensor.
//!
//! A vibration sensor wired to a GPIO pin produces a burst of rising edges
//! while the appliance it is attached to runs. This crate debounces those
//! edges into an "appliance active" state and publishes start and finish
//! alerts over MQTT, along with retained online/offline announcements.
//!
//! # Components
//!
//! - [`state`]: the debounce/hysteresis state machine
//! - [`monitor`]: the task that owns the state machine and runs the heartbeat
//! - [`alert`]: maps transitions to alert messages
//! - [`availability`]: boot and farewell announcements
//! - [`protocol`]: the best-effort MQTT publisher
//! - [`sensor`]: the GPIO edge source
//! - [`lifecycle`]: startup/shutdown sequencing and signal handling
//! - [`config`]: the configuration file
//!
//! # Quick Start
//!
//! ```no_run
//! use vibration_monitor::{Availability, AlertDispatcher, Config, Monitor, MqttPublisher};
//! use vibration_monitor::{lifecycle, sensor};
//!
//! #[tokio::main]
//! async fn main() -> vibration_monitor::Result<()> {
//!     let config = Config::load("/etc/vibration.toml")?;
//!     let publisher = MqttPublisher::from_config(&config)?;
//!
//!     let (monitor, handle) = Monitor::new(
//!         config.thresholds(),
//!         AlertDispatcher::from_config(&config),
//!         publisher.clone(),
//!     );
//!     let _watch = sensor::watch(config.main.sensor_pin, handle.edge_sender())?;
//!
//!     let availability = Availability::from_config(&config);
//!     lifecycle::run(monitor, &availability, &publisher, lifecycle::shutdown_signal()).await;
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod availability;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod protocol;
pub mod sensor;
pub mod state;

pub use alert::{AlertDispatcher, DispatchOutcome};
pub use availability::Availability;
pub use config::Config;
pub use error::{Error, Result};
pub use monitor::{EdgeSender, Monitor, MonitorHandle};
pub use protocol::{MqttPublisher, Publisher};
pub use state::{Debouncer, Thresholds, Transition};
