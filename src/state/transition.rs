// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance state transitions.
//!
//! A [`Transition`] is produced by [`Debouncer::tick`](super::Debouncer::tick)
//! whenever the appliance state flips. At most one transition is produced
//! per tick.

use std::fmt;

/// A change of the derived appliance state.
///
/// # Examples
///
/// ```
/// use vibration_monitor::state::Transition;
///
/// let transition = Transition::ApplianceActivated;
/// assert!(transition.is_active());
/// assert_eq!(transition.to_string(), "appliance activated");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Vibration persisted past the start threshold.
    ApplianceActivated,

    /// Silence persisted past the end threshold.
    ApplianceDeactivated,
}

impl Transition {
    /// Returns the appliance state after this transition.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::ApplianceActivated)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplianceActivated => f.write_str("appliance activated"),
            Self::ApplianceDeactivated => f.write_str("appliance deactivated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivation_is_not_active() {
        assert!(!Transition::ApplianceDeactivated.is_active());
    }

    #[test]
    fn display() {
        assert_eq!(
            Transition::ApplianceDeactivated.to_string(),
            "appliance deactivated"
        );
    }
}
