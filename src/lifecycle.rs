// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Startup and shutdown.
//!
//! [`run`] announces the monitor as online, runs it until a termination
//! request arrives, then publishes the farewell and returns. Both
//! announcements go through the same bounded publisher, so an unreachable
//! broker delays shutdown by at most one publish timeout.

use std::fmt;
use std::future::Future;

use tokio::signal;

use crate::availability::Availability;
use crate::monitor::Monitor;
use crate::protocol::Publisher;

/// Why the process is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl-C (SIGINT).
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Waits for Ctrl-C or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal() -> ShutdownReason {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => ShutdownReason::Interrupt,
        () = terminate => ShutdownReason::Terminate,
    }
}

/// Runs `monitor` between the boot and farewell announcements.
///
/// Returns the shutdown reason, or `None` if the monitor stopped on its own.
pub async fn run<P, F>(
    monitor: Monitor<P>,
    availability: &Availability,
    publisher: &P,
    shutdown: F,
) -> Option<ShutdownReason>
where
    P: Publisher,
    F: Future<Output = ShutdownReason>,
{
    availability.announce_boot(publisher).await;

    tokio::select! {
        () = monitor.run() => None,
        reason = shutdown => {
            tracing::debug!("received {reason}, cleaning up");
            availability.announce_shutdown(publisher).await;
            Some(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::alert::AlertDispatcher;
    use crate::monitor::MonitorHandle;
    use crate::protocol::testing::RecordingPublisher;
    use crate::state::Thresholds;

    fn monitor(publisher: RecordingPublisher) -> (Monitor<RecordingPublisher>, MonitorHandle) {
        Monitor::new(
            Thresholds::new(Duration::from_secs(5), Duration::from_secs(10)),
            AlertDispatcher::new("alerts", "started", "finished"),
            publisher,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn announces_boot_then_farewell() {
        let publisher = RecordingPublisher::new();
        let (monitor, _handle) = monitor(publisher.clone());
        let availability = Availability::new("status", "online", "offline");

        let shutdown = async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            ShutdownReason::Terminate
        };
        let reason = run(monitor, &availability, &publisher, shutdown).await;

        assert_eq!(reason, Some(ShutdownReason::Terminate));
        let calls = publisher.calls();
        assert_eq!(publisher.payloads(), vec!["online", "offline"]);
        assert!(calls.iter().all(|call| call.retain && call.topic == "status"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_farewell_still_shuts_down() {
        let publisher = RecordingPublisher::failing();
        let (monitor, _handle) = monitor(publisher.clone());
        let availability = Availability::new("status", "online", "offline");

        let reason = run(monitor, &availability, &publisher, async {
            ShutdownReason::Interrupt
        })
        .await;

        assert_eq!(reason, Some(ShutdownReason::Interrupt));
        assert_eq!(publisher.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_farewell_without_term_message() {
        let publisher = RecordingPublisher::new();
        let (monitor, _handle) = monitor(publisher.clone());
        let availability = Availability::new("status", "online", "");

        run(monitor, &availability, &publisher, async {
            ShutdownReason::Terminate
        })
        .await;

        assert_eq!(publisher.payloads(), vec!["online"]);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_none_when_monitor_stops() {
        let publisher = RecordingPublisher::new();
        let (monitor, handle) = monitor(publisher.clone());
        drop(handle);
        let availability = Availability::new("", "online", "offline");

        let reason = run(monitor, &availability, &publisher, std::future::pending()).await;

        assert_eq!(reason, None);
        assert!(publisher.calls().is_empty());
    }

    #[test]
    fn reason_display() {
        assert_eq!(ShutdownReason::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownReason::Interrupt.to_string(), "SIGINT");
    }
}
