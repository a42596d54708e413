//! Session clock: owns session time and pause.
//!
//! Session time drives the countdown, the spawn cadence, the level banner and
//! the delayed lobby return. It stands still while paused. Wall-clock economy
//! timers (hourly refill, daily reward) never read it.

use crate::types::SessionTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionClock {
    pub now:    SessionTime,
    pub paused: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` time units. Returns the new session time.
    /// Panics if called while paused; callers must check.
    pub fn advance(&mut self, dt: SessionTime) -> SessionTime {
        assert!(!self.paused, "advance() called on paused clock");
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        self.now
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
