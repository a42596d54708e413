//! Spawn cadence and target selection.
//!
//! Physics and rendering of targets live with Presentation. This module only
//! decides *when* the next target launches and *which* kind it is; the
//! session controller arms a `Spawn` timer every `interval` while play is
//! active and reports each launch as a `TargetSpawned` event.

use crate::{
    config::{SessionConfig, TargetKind},
    rng::SpawnRng,
    types::SessionTime,
};

pub struct SpawnSchedule {
    interval: SessionTime,
    base:     SessionTime,
    step:     SessionTime,
    floor:    SessionTime,
    roster:   Vec<TargetKind>,
    rng:      SpawnRng,
    running:  bool,
}

impl SpawnSchedule {
    pub fn new(config: &SessionConfig, rng: SpawnRng) -> Self {
        let mut schedule = Self {
            interval: config.base_spawn_interval,
            base:     config.base_spawn_interval,
            step:     config.spawn_interval_step,
            floor:    config.spawn_interval_floor,
            roster:   config.targets.clone(),
            rng,
            running:  false,
        };
        schedule.set_interval(config.base_spawn_interval);
        schedule
    }

    pub fn interval(&self) -> SessionTime {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop and go back to the base cadence.
    pub fn rewind(&mut self) {
        self.running = false;
        self.set_interval(self.base);
    }

    /// Rewind for a new session, with a fresh stream.
    pub fn reset(&mut self, rng: SpawnRng) {
        self.rng = rng;
        self.rewind();
    }

    /// Start launching. Higher difficulty divides the interval.
    pub fn start(&mut self, difficulty: f64) -> SessionTime {
        self.set_interval(self.interval / difficulty);
        self.running = true;
        self.interval
    }

    /// One level-up worth of speed.
    pub fn speed_up(&mut self) -> SessionTime {
        self.set_interval(self.interval - self.step);
        self.interval
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Choose the next target kind, uniformly over the roster.
    pub fn pick(&mut self) -> &TargetKind {
        let index = self.rng.next_u64_below(self.roster.len() as u64) as usize;
        &self.roster[index]
    }

    // Every interval change goes through here so the floor always holds.
    fn set_interval(&mut self, interval: SessionTime) {
        self.interval = if interval.is_finite() {
            interval.max(self.floor)
        } else {
            self.floor
        };
    }
}
