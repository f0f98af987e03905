// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message bus publishing.
//!
//! The monitor only ever publishes: alerts on the alert topic and online /
//! offline announcements on the availability topic. Delivery is best effort
//! (QoS 0, no retry, no queue). [`Publisher`] is the seam between the
//! monitor and the bus; [`MqttPublisher`] is the MQTT implementation.

mod mqtt;

pub use mqtt::{MqttPublisher, MqttPublisherBuilder};

use std::future::Future;

use crate::error::ProtocolError;

/// Something that can publish a text payload to a topic.
pub trait Publisher: Send + Sync {
    /// Publishes `payload` to `topic`, asking the broker to retain it if
    /// `retain` is set.
    ///
    /// Implementations must bound how long this takes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message could not be handed to the
    /// broker.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}

/// Publishes and swallows any failure.
///
/// Failures are logged at debug level. Returns whether the publish succeeded.
pub async fn publish_best_effort<P: Publisher>(
    publisher: &P,
    topic: &str,
    payload: &str,
    retain: bool,
) -> bool {
    match publisher.publish(topic, payload, retain).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(
                topic = %topic,
                payload = %payload,
                error = %e,
                "Failed to publish MQTT message"
            );
            false
        }
    }
}
