// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot MQTT publisher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, QoS};

use crate::config::Config;
use crate::error::ProtocolError;
use crate::protocol::Publisher;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Publishes single messages over MQTT.
///
/// Every publish opens its own connection with a clean session, sends one
/// QoS 0 message and disconnects, so no connection state survives between
/// publishes. The whole exchange is bounded by the configured timeout.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use vibration_monitor::protocol::{MqttPublisher, Publisher};
///
/// # async fn example() -> Result<(), vibration_monitor::error::ProtocolError> {
/// let publisher = MqttPublisher::builder()
///     .host("192.168.1.50")
///     .port(1883)
///     .credentials("user", "password")
///     .timeout(Duration::from_secs(2))
///     .build()?;
///
/// publisher.publish("laundry/washer", "Washer finished", false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    client_id: String,
    timeout: Duration,
}

impl MqttPublisher {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MqttPublisherBuilder {
        MqttPublisherBuilder::default()
    }

    /// Creates a publisher from the `[mqtt]` section of the configuration.
    ///
    /// An empty user name disables authentication; an empty client id is
    /// replaced by a generated one.
    ///
    /// # Errors
    ///
    /// Returns error if the builder rejects the settings.
    pub fn from_config(config: &Config) -> Result<Self, ProtocolError> {
        let mqtt = &config.mqtt;
        let mut builder = Self::builder()
            .host(&mqtt.hostname)
            .port(mqtt.port)
            .timeout(config.publish_timeout());

        if !mqtt.username.is_empty() {
            builder = builder.credentials(&mqtt.username, &mqtt.password);
        }
        if !mqtt.client_id.trim().is_empty() {
            builder = builder.client_id(mqtt.client_id.trim());
        }
        builder.build()
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the client id used for every connection.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns whether authentication is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the per-publish timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(KEEP_ALIVE);
        options.set_clean_session(true);
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username, password);
        }
        options
    }

    /// Connects, publishes, and disconnects without a time bound.
    async fn publish_once(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> Result<(), ProtocolError> {
        let (client, mut event_loop) = AsyncClient::new(self.options(), 10);

        // Requests are queued until the event loop has connected.
        client
            .publish(topic, QoS::AtMostOnce, retain, payload.as_bytes().to_vec())
            .await?;
        client.disconnect().await?;

        loop {
            match event_loop.poll().await? {
                Event::Incoming(rumqttc::Packet::ConnAck(connack)) => {
                    tracing::trace!(?connack, "MQTT connected");
                }
                Event::Outgoing(Outgoing::Publish(_)) => {
                    tracing::debug!(topic = %topic, retain, "Published MQTT message");
                }
                Event::Outgoing(Outgoing::Disconnect) => return Ok(()),
                _ => {}
            }
        }
    }
}

impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), ProtocolError> {
        tracing::debug!(
            host = %self.host,
            port = self.port,
            topic = %topic,
            payload = %payload,
            retain,
            "Publishing MQTT message"
        );

        // Safe: timeout in practical use will never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.timeout.as_millis() as u64;

        tokio::time::timeout(self.timeout, self.publish_once(topic, payload, retain))
            .await
            .map_err(|_| ProtocolError::Timeout(timeout_ms))?
    }
}

/// Builder for an [`MqttPublisher`].
#[derive(Debug, Default)]
pub struct MqttPublisherBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    timeout: Option<Duration>,
}

impl MqttPublisherBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the broker host name or address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the broker port (default 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets authentication credentials for the MQTT broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the upper bound on a single publish (default 5 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the publisher. No connection is made until the first publish.
    ///
    /// # Errors
    ///
    /// Returns error if the host is missing or the client id is invalid.
    pub fn build(self) -> Result<MqttPublisher, ProtocolError> {
        let host = self
            .host
            .ok_or_else(|| ProtocolError::InvalidAddress("host is required".to_string()))?;

        // Generate or use provided client ID (PID + counter to avoid conflicts)
        let client_id = match self.client_id {
            Some(id) if id.is_empty() || id.starts_with(' ') => {
                return Err(ProtocolError::InvalidAddress(format!(
                    "invalid client id: {id:?}"
                )));
            }
            Some(id) => id,
            None => {
                let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
                format!("vibration_{}_{}", std::process::id(), counter)
            }
        };

        let credentials = match (self.username, self.password) {
            (Some(username), password) => Some((username, password.unwrap_or_default())),
            (None, _) => None,
        };

        Ok(MqttPublisher {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            credentials,
            client_id,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}
