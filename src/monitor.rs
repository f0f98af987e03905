// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The monitor task.
//!
//! A single [`Monitor`] task owns the [`Debouncer`] and is the only code that
//! touches it. Sensor edges arrive as timestamped messages on an unbounded
//! channel, so the edge callback never blocks, and the heartbeat runs inside
//! the same loop, so ticks and edges are applied one at a time.
//!
//! # Heartbeat
//!
//! The loop is either idle (waiting for the next tick while applying edges)
//! or evaluating one tick (running the debouncer and dispatching any alert).
//! The next tick is scheduled one interval after the previous evaluation
//! *completes*, so a slow publish delays the following tick rather than
//! overlapping it. Edges that arrive during an evaluation queue up and are
//! applied, with their original timestamps, once it finishes.
//!
//! # Examples
//!
//! ```no_run
//! use vibration_monitor::alert::AlertDispatcher;
//! use vibration_monitor::monitor::Monitor;
//! use vibration_monitor::protocol::MqttPublisher;
//! use vibration_monitor::state::Thresholds;
//! use std::time::Duration;
//!
//! # async fn example() -> vibration_monitor::Result<()> {
//! let publisher = MqttPublisher::builder().host("192.168.1.50").build()?;
//! let dispatcher = AlertDispatcher::new("laundry/washer", "Washer started", "Washer finished");
//! let thresholds = Thresholds::new(Duration::from_secs(10), Duration::from_secs(300));
//!
//! let (monitor, handle) = Monitor::new(thresholds, dispatcher, publisher);
//! let edges = handle.edge_sender();
//! tokio::spawn(monitor.run());
//!
//! // From the GPIO callback:
//! edges.notify();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::alert::AlertDispatcher;
use crate::error::{Error, Result};
use crate::protocol::Publisher;
use crate::state::{Debouncer, Snapshot, Thresholds};

/// Time between the end of one heartbeat and the start of the next.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Messages posted to the monitor task.
#[derive(Debug)]
enum Command {
    /// A rising edge observed at the given instant.
    Edge(Instant),
    /// Request for a copy of the current state.
    Snapshot(oneshot::Sender<Snapshot>),
}

/// Posts sensor edges to the monitor.
///
/// Cheap to clone and safe to call from any thread, including a GPIO
/// interrupt callback. Sending never blocks.
#[derive(Debug, Clone)]
pub struct EdgeSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl EdgeSender {
    /// Reports a rising edge seen now.
    ///
    /// Returns `false` if the monitor has stopped.
    pub fn notify(&self) -> bool {
        self.notify_at(Instant::now())
    }

    /// Reports a rising edge seen at `at`.
    ///
    /// Returns `false` if the monitor has stopped.
    pub fn notify_at(&self, at: Instant) -> bool {
        self.tx.send(Command::Edge(at)).is_ok()
    }
}

/// Handle to a running [`Monitor`].
///
/// The monitor stops once every handle and edge sender has been dropped.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl MonitorHandle {
    /// Returns a sender for sensor edges.
    #[must_use]
    pub fn edge_sender(&self) -> EdgeSender {
        EdgeSender {
            tx: self.tx.clone(),
        }
    }

    /// Returns a copy of the monitor's current state.
    ///
    /// The request is queued behind any pending edges, so the snapshot
    /// reflects every edge posted before the call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MonitorStopped`] if the monitor task has exited.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply_tx))
            .map_err(|_| Error::MonitorStopped)?;
        reply_rx.await.map_err(|_| Error::MonitorStopped)
    }
}

/// Owns the debouncer and drives the heartbeat.
#[derive(Debug)]
pub struct Monitor<P> {
    debouncer: Debouncer,
    dispatcher: AlertDispatcher,
    publisher: P,
    interval: Duration,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl<P: Publisher> Monitor<P> {
    /// Creates a monitor whose clock starts now.
    #[must_use]
    pub fn new(
        thresholds: Thresholds,
        dispatcher: AlertDispatcher,
        publisher: P,
    ) -> (Self, MonitorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let monitor = Self {
            debouncer: Debouncer::new(thresholds, Instant::now()),
            dispatcher,
            publisher,
            interval: HEARTBEAT_INTERVAL,
            rx,
        };
        (monitor, MonitorHandle { tx })
    }

    /// Overrides the heartbeat interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs the heartbeat loop until every handle is dropped.
    pub async fn run(mut self) {
        let mut next_tick = Instant::now() + self.interval;

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        tracing::debug!("All monitor handles dropped, stopping");
                        return;
                    }
                },
                () = tokio::time::sleep_until(next_tick) => {
                    self.heartbeat().await;
                    next_tick = Instant::now() + self.interval;
                }
            }
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Edge(at) => {
                tracing::debug!("Vibrated");
                self.debouncer.on_edge(at);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.debouncer.snapshot());
            }
        }
    }

    /// Evaluates one tick and dispatches its transition, if any.
    async fn heartbeat(&mut self) {
        let now = Instant::now();
        let transition = self.debouncer.tick(now);

        let vibration = self.debouncer.vibration();
        tracing::debug!(
            vibrating = vibration.is_vibrating(),
            active = self.debouncer.appliance().is_active(),
            sustained = ?vibration.sustained(),
            idle = ?vibration.idle(now),
            "HB"
        );

        if let Some(transition) = transition {
            self.dispatcher.dispatch(&self.publisher, transition).await;
        }
    }
}
