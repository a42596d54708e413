//! Progression and economy core for an arcade target-clicking game.
//!
//! A timed play session (countdown, scoring, levels, win or loss, limited
//! attempts) on top of a persistent coin economy (entry fees, hourly refill,
//! daily login rewards) shared by a lobby and a gameplay save context.
//! Start with [`engine::ArcadeEngine`].

pub mod clock;
pub mod command;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod spawner;
pub mod store;
pub mod timer;
pub mod types;
