// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance start/stop alerts.
//!
//! [`AlertDispatcher`] maps a [`Transition`] to its configured message, logs
//! it, and publishes it (non-retained) on the alert topic. A blank message
//! turns alerting off for that transition; an empty topic keeps alerts in
//! the log only.

use crate::config::Config;
use crate::protocol::{Publisher, publish_best_effort};
use crate::state::Transition;

/// An outbound alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert<'a> {
    /// Topic to publish on, if alert publishing is enabled.
    pub topic: Option<&'a str>,
    /// Message text.
    pub payload: &'a str,
}

impl Alert<'_> {
    /// Alerts are never retained.
    pub const RETAIN: bool = false;
}

/// What happened to a dispatched transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message for this transition is blank.
    Disabled,
    /// Logged; no alert topic is configured.
    LoggedOnly,
    /// Logged and handed to the broker.
    Published,
    /// Logged, but the publish failed.
    PublishFailed,
}

/// Turns transitions into alerts.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    topic: String,
    start_message: String,
    end_message: String,
}

impl AlertDispatcher {
    /// Creates a dispatcher for `topic` with the given messages.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        start_message: impl Into<String>,
        end_message: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            start_message: start_message.into(),
            end_message: end_message.into(),
        }
    }

    /// Creates a dispatcher from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.mqtt.topic.clone(),
            config.main.start_message.clone(),
            config.main.end_message.clone(),
        )
    }

    /// Returns the configured message for `transition`.
    #[must_use]
    pub fn message_for(&self, transition: Transition) -> &str {
        match transition {
            Transition::ApplianceActivated => &self.start_message,
            Transition::ApplianceDeactivated => &self.end_message,
        }
    }

    /// Builds the alert for `transition`, or `None` if its message is blank.
    #[must_use]
    pub fn alert(&self, transition: Transition) -> Option<Alert<'_>> {
        let payload = self.message_for(transition);
        if payload.trim().is_empty() {
            return None;
        }
        let topic = (!self.topic.is_empty()).then_some(self.topic.as_str());
        Some(Alert { topic, payload })
    }

    /// Logs and publishes the alert for `transition`.
    ///
    /// Never fails: publish errors are logged at debug level and dropped.
    pub async fn dispatch<P: Publisher>(
        &self,
        publisher: &P,
        transition: Transition,
    ) -> DispatchOutcome {
        let Some(alert) = self.alert(transition) else {
            tracing::debug!(%transition, "Alert message is empty, not sending");
            return DispatchOutcome::Disabled;
        };

        tracing::info!("{}", alert.payload);

        let Some(topic) = alert.topic else {
            return DispatchOutcome::LoggedOnly;
        };
        if publish_best_effort(publisher, topic, alert.payload, Alert::RETAIN).await {
            DispatchOutcome::Published
        } else {
            DispatchOutcome::PublishFailed
        }
    }
}
