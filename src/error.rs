// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the vibration monitor.
//!
//! Configuration and sensor errors are fatal at startup. Protocol errors are
//! transient: callers log them and carry on.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Publishing to the MQTT broker failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The vibration sensor could not be set up.
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// The monitor task is no longer running.
    #[error("monitor has stopped")]
    MonitorStopped,
}

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or a required key is missing.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A key has a value the monitor cannot use.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Errors related to MQTT publishing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected the request.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Publish did not complete in time.
    #[error("publish timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl From<rumqttc::ConnectionError> for ProtocolError {
    fn from(err: rumqttc::ConnectionError) -> Self {
        Self::ConnectionFailed(err.to_string())
    }
}

/// Errors related to the GPIO edge source.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The GPIO peripheral could not be configured.
    #[cfg(feature = "gpio")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// The binary was built without GPIO support.
    #[error("GPIO support is not compiled in (enable the `gpio` feature)")]
    Unsupported,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
