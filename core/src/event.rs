//! Everything Presentation can observe about a play session.
//!
//! RULE: Presentation never reads controller internals to decide what to
//! show next. Each operation returns the events it produced, in order.

use crate::types::{Coins, Score, SessionId, SessionTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session lifecycle ──────────────────────────
    SessionStarted {
        session_id: SessionId,
        difficulty: f64,
        high_score: Score,
    },
    CountdownTick {
        remaining: u32,
    },
    /// The "GO" display; play becomes active when it ends.
    CountdownGo,
    PlayStarted {
        spawn_interval: SessionTime,
    },
    Paused,
    Resumed,
    SessionReset,

    // ── Play ───────────────────────────────────────
    TargetSpawned {
        kind: String,
        points: i64,
        hazard: bool,
    },
    ScoreChanged {
        score: Score,
    },
    LevelUp {
        level: u32,
        spawn_interval: SessionTime,
    },
    LevelBannerHidden,

    // ── Outcome ────────────────────────────────────
    Won {
        score: Score,
        reward: Coins,
    },
    Lost {
        score: Score,
        attempts_remaining: u32,
    },
    HighScoreBeaten {
        high_score: Score,
    },
    /// The last attempt is gone; navigation should leave for the lobby.
    AttemptsExhausted,
    ReturnToLobby,

    // ── Economy ────────────────────────────────────
    RefillGranted {
        amount: Coins,
        balance: Coins,
    },
}
