//! Jump gating.
//!
//! A jump needs two things besides solid footing: enough time since the last
//! jump, and the lock from that jump to have been released. The lock is only
//! released by a walking tick, so landing straight on a steep slope keeps
//! jumping disabled until the character reaches walkable ground.

use serde::{Deserialize, Serialize};

/// Cooldown timer and lock for jumping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpGate {
    /// Time since the last jump (seconds). Starts at zero.
    timer: f32,

    /// Set by a jump, cleared by a walking tick.
    locked: bool,
}

impl JumpGate {
    /// Create a new jump gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the gate lets a jump through with the given cooldown.
    #[inline]
    pub fn is_open(&self, cooldown: f32) -> bool {
        self.timer > cooldown && !self.locked
    }

    /// Try to pass the gate. On success the timer restarts and the gate locks.
    pub fn try_pass(&mut self, cooldown: f32) -> bool {
        if !self.is_open(cooldown) {
            return false;
        }
        self.timer = 0.0;
        self.locked = true;
        true
    }

    /// Release the lock.
    #[inline]
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Advance the cooldown timer.
    #[inline]
    pub fn advance(&mut self, delta_time: f32) {
        self.timer += delta_time;
    }

    /// Check if the gate is locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Time since the last jump (seconds).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.timer
    }
}
