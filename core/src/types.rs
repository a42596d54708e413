//! Shared primitive types used across the whole crate.

/// A coin balance or amount. Balances never go negative.
pub type Coins = u64;

/// A play-session score. Hazard targets may subtract points.
pub type Score = i64;

/// Session time in time units (seconds at normal speed).
/// Only advances while a session is not paused.
pub type SessionTime = f64;

/// Unique identifier of one play session.
pub type SessionId = String;
