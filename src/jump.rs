//! Timed jump state.
//!
//! A jump lasts a fixed cooldown measured on the controller's clock. The
//! state is a stored deadline rather than a timer callback, so it can be
//! driven by simulated time.

use bevy::prelude::*;

/// Slack when comparing the clock against a deadline.
///
/// Frame deltas arrive as `f32` and are summed into an `f64` clock, so a
/// clock that has advanced by exactly the cooldown can sit a few ulps short
/// of the deadline.
const DEADLINE_EPSILON: f64 = 1e-6;

/// Jump state of a character: idle, or jumping until a deadline.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpState {
    /// Clock time at which the current jump ends.
    deadline: Option<f64>,
}

impl JumpState {
    /// Check if a jump is in progress.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clock time at which the current jump ends, if jumping.
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Seconds left in the current jump at clock time `now`.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.deadline.map(|deadline| (deadline - now).max(0.0))
    }

    /// Start a jump at `now` lasting `cooldown` seconds.
    ///
    /// Returns `false` without touching the state if a jump is already in
    /// progress.
    pub fn start(&mut self, now: f64, cooldown: f32) -> bool {
        if self.is_active() {
            return false;
        }
        self.deadline = Some(now + f64::from(cooldown));
        true
    }

    /// End the jump if its deadline has been reached at `now`, within
    /// [`DEADLINE_EPSILON`].
    ///
    /// Returns `true` on the call that ends the jump.
    pub fn expire(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now + DEADLINE_EPSILON >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
