// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Online/offline announcements on the availability topic.
//!
//! Both announcements are retained so that subscribers arriving later still
//! see the current status. An empty topic disables both; an empty message
//! disables just that announcement (so a blank `TERM_MESSAGE` gives the
//! boot-only behaviour).

use crate::config::Config;
use crate::protocol::{Publisher, publish_best_effort};

/// Availability announcements are always retained.
pub const RETAIN: bool = true;

/// Publishes boot and farewell messages.
#[derive(Debug, Clone)]
pub struct Availability {
    topic: String,
    boot_message: String,
    term_message: String,
}

impl Availability {
    /// Creates an announcer for `topic`.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        boot_message: impl Into<String>,
        term_message: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            boot_message: boot_message.into(),
            term_message: term_message.into(),
        }
    }

    /// Creates an announcer from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.mqtt.availability_topic.clone(),
            config.main.boot_message.clone(),
            config.main.term_message.clone(),
        )
    }

    /// Returns whether an availability topic is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.topic.is_empty()
    }

    /// Returns whether a farewell will be published on shutdown.
    #[must_use]
    pub fn has_farewell(&self) -> bool {
        self.is_enabled() && !self.term_message.trim().is_empty()
    }

    /// Publishes the boot message. Returns whether it was delivered.
    pub async fn announce_boot<P: Publisher>(&self, publisher: &P) -> bool {
        self.announce(publisher, &self.boot_message).await
    }

    /// Publishes the farewell message. Returns whether it was delivered.
    pub async fn announce_shutdown<P: Publisher>(&self, publisher: &P) -> bool {
        self.announce(publisher, &self.term_message).await
    }

    async fn announce<P: Publisher>(&self, publisher: &P, message: &str) -> bool {
        if !self.is_enabled() || message.trim().is_empty() {
            return false;
        }
        tracing::debug!("sending {} to {}", message, self.topic);
        publish_best_effort(publisher, &self.topic, message, RETAIN).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::testing::{Published, RecordingPublisher};

    fn availability() -> Availability {
        Availability::new("laundry/washer/availability", "online", "offline")
    }

    #[tokio::test]
    async fn boot_message_is_retained() {
        let publisher = RecordingPublisher::new();

        assert!(availability().announce_boot(&publisher).await);
        assert_eq!(
            publisher.calls(),
            vec![Published {
                topic: "laundry/washer/availability".to_string(),
                payload: "online".to_string(),
                retain: true,
            }]
        );
    }

    #[tokio::test]
    async fn farewell_is_retained() {
        let publisher = RecordingPublisher::new();

        assert!(availability().announce_shutdown(&publisher).await);
        let calls = publisher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload, "offline");
        assert!(calls[0].retain);
    }

    #[tokio::test]
    async fn empty_topic_disables_announcements() {
        let publisher = RecordingPublisher::new();
        let a = Availability::new("", "online", "offline");

        assert!(!a.is_enabled());
        assert!(!a.announce_boot(&publisher).await);
        assert!(!a.announce_shutdown(&publisher).await);
        assert!(publisher.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_term_message_disables_farewell_only() {
        let publisher = RecordingPublisher::new();
        let a = Availability::new("status", "online", "");

        assert!(!a.has_farewell());
        assert!(a.announce_boot(&publisher).await);
        assert!(!a.announce_shutdown(&publisher).await);
        assert_eq!(publisher.payloads(), vec!["online".to_string()]);
    }

    #[tokio::test]
    async fn failed_announcement_is_swallowed() {
        let publisher = RecordingPublisher::failing();

        assert!(!availability().announce_shutdown(&publisher).await);
        assert_eq!(publisher.calls().len(), 1);
    }
}
