// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vibration and appliance state.
//!
//! The [`Debouncer`] turns a train of raw sensor pulses into two booleans:
//! whether the sensor is *currently vibrating* (any pulse within the last
//! two seconds) and whether the *appliance is active* (vibration sustained
//! past a start threshold, ended by silence past an end threshold).
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use vibration_monitor::state::{Debouncer, Thresholds, Transition};
//!
//! let t0 = Instant::now();
//! let thresholds = Thresholds::new(Duration::from_secs(1), Duration::from_secs(3));
//! let mut debouncer = Debouncer::new(thresholds, t0);
//!
//! debouncer.on_edge(t0);
//! debouncer.on_edge(t0 + Duration::from_millis(1500));
//!
//! assert_eq!(
//!     debouncer.tick(t0 + Duration::from_secs(2)),
//!     Some(Transition::ApplianceActivated)
//! );
//! ```

mod transition;
mod vibration;

pub use transition::Transition;
pub use vibration::{
    ApplianceState, Debouncer, Snapshot, Thresholds, VIBRATION_WINDOW, VibrationState,
};
