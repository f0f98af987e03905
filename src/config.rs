// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration file loading.
//!
//! The configuration is a TOML file with a `[main]` and an `[mqtt]` table.
//! It is read once at startup and never reloaded.
//!
//! ```toml
//! [main]
//! VERBOSE = false
//! SENSOR_PIN = 14
//! SECONDS_TO_START = 10
//! SECONDS_TO_END = 300
//! START_MESSAGE = "Washer started"
//! END_MESSAGE = "Washer finished"
//! BOOT_MESSAGE = "online"
//! TERM_MESSAGE = "offline"
//!
//! [mqtt]
//! mqtt_hostname = "192.168.1.50"
//! mqtt_port = 1883
//! mqtt_topic = "laundry/washer"
//! mqtt_availability_topic = "laundry/washer/availability"
//! mqtt_username = ""
//! mqtt_password = ""
//! mqtt_clientid = "washer-monitor"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::state::Thresholds;

/// Default per-publish timeout in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Complete monitor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Sensor, threshold and message settings.
    pub main: MainSection,
    /// Broker connection and topic settings.
    pub mqtt: MqttSection,
}

/// The `[main]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MainSection {
    /// Raises the log level to debug.
    #[serde(rename = "VERBOSE")]
    pub verbose: bool,

    /// BCM number of the GPIO pin the sensor is wired to.
    #[serde(rename = "SENSOR_PIN")]
    pub sensor_pin: u8,

    /// Seconds vibration must persist before the appliance counts as active.
    #[serde(rename = "SECONDS_TO_START")]
    pub seconds_to_start: u64,

    /// Seconds of silence before the appliance counts as inactive.
    #[serde(rename = "SECONDS_TO_END")]
    pub seconds_to_end: u64,

    /// Alert sent when the appliance starts.
    #[serde(rename = "START_MESSAGE")]
    pub start_message: String,

    /// Alert sent when the appliance stops.
    #[serde(rename = "END_MESSAGE")]
    pub end_message: String,

    /// Availability payload published at startup.
    #[serde(rename = "BOOT_MESSAGE")]
    pub boot_message: String,

    /// Availability payload published on shutdown. Empty disables it.
    #[serde(rename = "TERM_MESSAGE", default)]
    pub term_message: String,
}

/// The `[mqtt]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttSection {
    /// Broker host name or address.
    #[serde(rename = "mqtt_hostname")]
    pub hostname: String,

    /// Broker port.
    #[serde(rename = "mqtt_port")]
    pub port: u16,

    /// Topic for start/stop alerts. Empty disables alert publishing.
    #[serde(rename = "mqtt_topic")]
    pub topic: String,

    /// Topic for online/offline announcements. Empty disables them.
    #[serde(rename = "mqtt_availability_topic")]
    pub availability_topic: String,

    /// Broker user name. Empty disables authentication.
    #[serde(rename = "mqtt_username")]
    pub username: String,

    /// Broker password.
    #[serde(rename = "mqtt_password")]
    pub password: String,

    /// MQTT client id. Empty lets the publisher generate one.
    #[serde(rename = "mqtt_clientid")]
    pub client_id: String,

    /// Upper bound on a single publish, in seconds.
    #[serde(rename = "mqtt_timeout_seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// lacks a required key, or holds an unusable value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mqtt = &self.mqtt;
        let publishes = !mqtt.topic.is_empty() || !mqtt.availability_topic.is_empty();

        if publishes && mqtt.hostname.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "mqtt_hostname",
                message: "required when a topic is configured".to_string(),
            });
        }
        if publishes && mqtt.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mqtt_port",
                message: "must not be zero".to_string(),
            });
        }
        if mqtt.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mqtt_timeout_seconds",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the debounce thresholds.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(
            Duration::from_secs(self.main.seconds_to_start),
            Duration::from_secs(self.main.seconds_to_end),
        )
    }

    /// Returns the per-publish timeout.
    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.mqtt.timeout_seconds)
    }
}
