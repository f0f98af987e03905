// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GPIO edge source.
//!
//! The sensor pin is configured as an input with the internal pull-down
//! enabled, and every rising edge is forwarded to the monitor through an
//! [`EdgeSender`]. The interrupt callback runs on a thread owned by the GPIO
//! driver; it only timestamps and enqueues the edge.

use crate::error::SensorError;
use crate::monitor::EdgeSender;

/// Keeps the edge interrupt registered. Dropping it stops edge delivery.
#[derive(Debug)]
pub struct SensorWatch {
    pin: u8,
    #[cfg(feature = "gpio")]
    _input: rppal::gpio::InputPin,
}

impl SensorWatch {
    /// Returns the BCM number of the watched pin.
    #[must_use]
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

/// Starts forwarding rising edges on BCM pin `pin` to `edges`.
///
/// # Errors
///
/// Returns [`SensorError`] if the GPIO peripheral is unavailable or the pin
/// cannot be configured.
#[cfg(feature = "gpio")]
pub fn watch(pin: u8, edges: EdgeSender) -> Result<SensorWatch, SensorError> {
    use rppal::gpio::{Gpio, Trigger};

    let mut input = Gpio::new()?.get(pin)?.into_input_pulldown();
    input.set_async_interrupt(Trigger::RisingEdge, None, move |_event| {
        if !edges.notify() {
            tracing::trace!("Edge dropped, monitor has stopped");
        }
    })?;

    tracing::debug!(pin, "Watching GPIO pin for rising edges");
    Ok(SensorWatch { pin, _input: input })
}

/// Starts forwarding rising edges on BCM pin `pin` to `edges`.
///
/// # Errors
///
/// Always returns [`SensorError::Unsupported`]: this build has no GPIO
/// support.
#[cfg(not(feature = "gpio"))]
pub fn watch(pin: u8, edges: EdgeSender) -> Result<SensorWatch, SensorError> {
    let _ = (pin, edges);
    Err(SensorError::Unsupported)
}
