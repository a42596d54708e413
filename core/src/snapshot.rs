//! Read-only view of the whole game for UI binding.
//!
//! Taken on demand; never persisted. Everything a widget shows comes from
//! here or from the events returned by the operations.

use crate::{
    session::{CountdownDisplay, SessionState},
    types::{Coins, Score, SessionTime},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArcadeSnapshot {
    // Economy
    pub coins:              Coins,
    pub remaining_attempts: u32,
    pub high_score:         Score,
    pub login_day_index:    u32,
    pub last_claim_date:    Option<NaiveDate>,
    pub next_refill_time:   Option<DateTime<Utc>>,
    // Session
    pub state:              SessionState,
    pub score:              Score,
    pub level:              u32,
    pub spawn_interval:     SessionTime,
    pub countdown:          Option<CountdownDisplay>,
    pub level_banner:       Option<u32>,
    pub session_time:       SessionTime,
}
