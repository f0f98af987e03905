// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounce and hysteresis state machine.

use std::time::Duration;

use tokio::time::Instant;

use super::Transition;

/// A pulse within this window keeps the sensor counted as vibrating.
pub const VIBRATION_WINDOW: Duration = Duration::from_secs(2);

/// Activation and deactivation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    start: Duration,
    end: Duration,
}

impl Thresholds {
    /// Creates thresholds from the start (sustain) and end (silence) durations.
    #[must_use]
    pub const fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    /// How long vibration must last before the appliance is active.
    #[must_use]
    pub const fn start(&self) -> Duration {
        self.start
    }

    /// How long silence must last before the appliance is inactive.
    #[must_use]
    pub const fn end(&self) -> Duration {
        self.end
    }
}

/// Pulse-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrationState {
    is_vibrating: bool,
    last_vibration: Instant,
    vibration_start: Instant,
}

impl VibrationState {
    /// Creates an idle state with both timestamps at `now`.
    #[must_use]
    pub const fn new(now: Instant) -> Self {
        Self {
            is_vibrating: false,
            last_vibration: now,
            vibration_start: now,
        }
    }

    /// Whether a pulse was seen recently.
    #[must_use]
    pub const fn is_vibrating(&self) -> bool {
        self.is_vibrating
    }

    /// Time of the most recent pulse.
    #[must_use]
    pub const fn last_vibration(&self) -> Instant {
        self.last_vibration
    }

    /// Time of the first pulse of the current episode.
    #[must_use]
    pub const fn vibration_start(&self) -> Instant {
        self.vibration_start
    }

    /// How long the current vibration episode has lasted.
    #[must_use]
    pub fn sustained(&self) -> Duration {
        self.last_vibration
            .saturating_duration_since(self.vibration_start)
    }

    /// Time since the most recent pulse.
    #[must_use]
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_vibration)
    }
}

/// Appliance-level state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplianceState {
    is_active: bool,
}

impl ApplianceState {
    /// Whether the appliance is considered running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}

/// A copy of the debouncer state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Pulse-level state.
    pub vibration: VibrationState,
    /// Appliance-level state.
    pub appliance: ApplianceState,
}

/// Debounce state machine.
///
/// [`on_edge`](Self::on_edge) records a raw pulse; [`tick`](Self::tick) runs
/// the periodic evaluation. Callers must serialize the two, which `&mut self`
/// enforces.
///
/// The activation and deactivation checks in `tick` read the vibrating flag
/// as left by the previous tick (or set by an edge since then). The flag is
/// recomputed from the idle time only after both checks, so a burst that
/// has already gone quiet is still seen as vibrating for one more tick.
#[derive(Debug, Clone)]
pub struct Debouncer {
    thresholds: Thresholds,
    vibration: VibrationState,
    appliance: ApplianceState,
}

impl Debouncer {
    /// Creates an idle debouncer whose clock starts at `now`.
    #[must_use]
    pub const fn new(thresholds: Thresholds, now: Instant) -> Self {
        Self {
            thresholds,
            vibration: VibrationState::new(now),
            appliance: ApplianceState { is_active: false },
        }
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Returns the pulse-level state.
    #[must_use]
    pub const fn vibration(&self) -> &VibrationState {
        &self.vibration
    }

    /// Returns the appliance-level state.
    #[must_use]
    pub const fn appliance(&self) -> &ApplianceState {
        &self.appliance
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub const fn snapshot(&self) -> Snapshot {
        Snapshot {
            vibration: self.vibration,
            appliance: self.appliance,
        }
    }

    /// Records a rising edge seen at `at`.
    ///
    /// A pulse that opens a new episode also marks its start and sets the
    /// vibrating flag immediately.
    pub fn on_edge(&mut self, at: Instant) {
        // Timestamps never move backwards, so start <= last holds.
        let at = at.max(self.vibration.last_vibration);
        self.vibration.last_vibration = at;
        if !self.vibration.is_vibrating {
            self.vibration.vibration_start = at;
            self.vibration.is_vibrating = true;
        }
    }

    /// Runs one heartbeat evaluation at `now`.
    ///
    /// Returns the appliance transition this tick produced, if any.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        let idle = self.vibration.idle(now);
        let vibrating = self.vibration.is_vibrating;

        let transition = if vibrating
            && self.vibration.sustained() > self.thresholds.start
            && !self.appliance.is_active
        {
            self.appliance.is_active = true;
            Some(Transition::ApplianceActivated)
        } else if !vibrating && self.appliance.is_active && idle > self.thresholds.end {
            self.appliance.is_active = false;
            Some(Transition::ApplianceDeactivated)
        } else {
            None
        };

        self.vibration.is_vibrating = idle < VIBRATION_WINDOW;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn debouncer(start: u64, end: u64, t0: Instant) -> Debouncer {
        Debouncer::new(
            Thresholds::new(Duration::from_secs(start), Duration::from_secs(end)),
            t0,
        )
    }

    /// Feeds `pulses` (milliseconds after `t0`) and ticks once per whole
    /// second up to `until`, returning each transition with its tick second.
    fn simulate(
        debouncer: &mut Debouncer,
        t0: Instant,
        pulses: &[u64],
        until: u64,
    ) -> Vec<(u64, Transition)> {
        let mut pending = pulses.iter().copied().peekable();
        let mut transitions = Vec::new();

        for second in 1..=until {
            while let Some(pulse) = pending.next_if(|p| *p <= second * 1000) {
                debouncer.on_edge(t0 + ms(pulse));
            }
            if let Some(transition) = debouncer.tick(t0 + Duration::from_secs(second)) {
                transitions.push((second, transition));
            }
        }
        transitions
    }

    fn pulse_train(from: u64, to: u64, every: u64) -> Vec<u64> {
        (from..=to).step_by(usize::try_from(every).unwrap()).collect()
    }

    #[test]
    fn new_debouncer_is_idle() {
        let t0 = Instant::now();
        let d = debouncer(5, 10, t0);

        assert!(!d.vibration().is_vibrating());
        assert!(!d.appliance().is_active());
        assert_eq!(d.vibration().last_vibration(), t0);
        assert_eq!(d.vibration().vibration_start(), t0);
    }

    #[test]
    fn edge_sets_vibrating_immediately() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        d.on_edge(t0 + ms(300));

        assert!(d.vibration().is_vibrating());
        assert_eq!(d.vibration().vibration_start(), t0 + ms(300));
        assert_eq!(d.vibration().last_vibration(), t0 + ms(300));
    }

    #[test]
    fn edge_while_vibrating_keeps_episode_start() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        d.on_edge(t0 + ms(300));
        d.on_edge(t0 + ms(800));

        assert_eq!(d.vibration().vibration_start(), t0 + ms(300));
        assert_eq!(d.vibration().last_vibration(), t0 + ms(800));
        assert_eq!(d.vibration().sustained(), ms(500));
    }

    #[test]
    fn silence_longer_than_window_clears_vibrating() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        d.on_edge(t0);
        d.tick(t0 + ms(1900));
        assert!(d.vibration().is_vibrating());

        d.tick(t0 + ms(2100));
        assert!(!d.vibration().is_vibrating());
    }

    #[test]
    fn single_pulse_never_activates() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        let transitions = simulate(&mut d, t0, &[500], 60);

        assert!(transitions.is_empty());
        assert!(!d.appliance().is_active());
    }

    #[test]
    fn single_pulse_never_activates_with_zero_start() {
        let t0 = Instant::now();
        let mut d = debouncer(0, 10, t0);

        let transitions = simulate(&mut d, t0, &[500], 10);

        assert!(transitions.is_empty());
    }

    #[test]
    fn sustained_train_activates_once_then_deactivates_once() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        let pulses = pulse_train(500, 6000, 500);
        let transitions = simulate(&mut d, t0, &pulses, 60);

        assert_eq!(
            transitions,
            vec![
                (6, Transition::ApplianceActivated),
                (17, Transition::ApplianceDeactivated),
            ]
        );
        assert!(!d.appliance().is_active());
    }

    #[test]
    fn short_train_does_not_activate() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        let pulses = pulse_train(500, 4500, 500);
        let transitions = simulate(&mut d, t0, &pulses, 30);

        assert!(transitions.is_empty());
    }

    #[test]
    fn brief_pause_does_not_deactivate() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0);

        // Running cycle with an 8 second pause in the middle.
        let mut pulses = pulse_train(500, 8000, 500);
        pulses.extend(pulse_train(16_000, 20_000, 500));
        let transitions = simulate(&mut d, t0, &pulses, 25);

        assert_eq!(transitions, vec![(6, Transition::ApplianceActivated)]);
        assert!(d.appliance().is_active());
    }

    #[test]
    fn new_episode_after_deactivation_reactivates() {
        let t0 = Instant::now();
        let mut d = debouncer(2, 3, t0);

        let mut pulses = pulse_train(500, 3000, 500);
        pulses.extend(pulse_train(20_000, 24_000, 500));
        let transitions = simulate(&mut d, t0, &pulses, 40);

        assert_eq!(
            transitions,
            vec![
                (3, Transition::ApplianceActivated),
                (7, Transition::ApplianceDeactivated),
                (23, Transition::ApplianceActivated),
                (28, Transition::ApplianceDeactivated),
            ]
        );
    }

    #[test]
    fn activation_check_sees_flag_from_before_the_tick() {
        let t0 = Instant::now();
        let mut d = debouncer(0, 10, t0);

        d.on_edge(t0 + ms(100));
        d.on_edge(t0 + ms(200));

        // Silence has already exceeded the window, but the flag set by the
        // edges is still in effect for this tick's activation check.
        assert_eq!(d.tick(t0 + ms(3000)), Some(Transition::ApplianceActivated));
        assert!(!d.vibration().is_vibrating());
    }

    #[test]
    fn deactivation_waits_for_flag_to_clear() {
        let t0 = Instant::now();
        let mut d = debouncer(0, 0, t0);

        d.on_edge(t0 + ms(100));
        d.on_edge(t0 + ms(200));
        assert_eq!(d.tick(t0 + ms(1000)), Some(Transition::ApplianceActivated));

        // Idle already exceeds the zero end threshold, but the flag is
        // still set: 1.8s idle at the 2s tick keeps it set once more.
        assert_eq!(d.tick(t0 + ms(2000)), None);
        assert_eq!(d.tick(t0 + ms(3000)), None);
        assert!(!d.vibration().is_vibrating());
        assert_eq!(d.tick(t0 + ms(4000)), Some(Transition::ApplianceDeactivated));
    }

    #[test]
    fn transitions_agree_with_vibrating_flag() {
        let t0 = Instant::now();
        let mut d = debouncer(1, 2, t0);
        let pulses = pulse_train(250, 5000, 250);
        let mut pending = pulses.iter().copied().peekable();

        for step in 1..=40u64 {
            let now = step * 500;
            while let Some(p) = pending.next_if(|p| *p <= now) {
                d.on_edge(t0 + ms(p));
            }
            let vibrating_before = d.vibration().is_vibrating();
            match d.tick(t0 + ms(now)) {
                Some(Transition::ApplianceActivated) => assert!(vibrating_before),
                Some(Transition::ApplianceDeactivated) => assert!(!vibrating_before),
                None => {}
            }
        }
    }

    #[test]
    fn start_never_exceeds_last() {
        let t0 = Instant::now();
        let mut d = debouncer(3, 4, t0);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut now = t0;

        for _ in 0..5_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            now += ms(seed % 1_500);
            if seed % 3 == 0 {
                d.tick(now);
            } else {
                d.on_edge(now);
            }
            let v = d.vibration();
            assert!(v.vibration_start() <= v.last_vibration());
        }
    }

    #[test]
    fn late_edge_does_not_move_clock_backwards() {
        let t0 = Instant::now();
        let mut d = debouncer(5, 10, t0 + ms(1000));

        d.on_edge(t0);

        let v = d.vibration();
        assert_eq!(v.last_vibration(), t0 + ms(1000));
        assert!(v.vibration_start() <= v.last_vibration());
    }
}
