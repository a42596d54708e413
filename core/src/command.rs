use crate::{
    economy::{DailyRewardOutcome, EntryOutcome},
    event::GameEvent,
    types::{Coins, SessionTime},
};
use serde::{Deserialize, Serialize};

/// Every operation Presentation/Navigation can issue, in serialisable form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Lobby ─────────────────────────────────────
    TryEnterGame,
    ClaimDailyReward,
    /// Debug top-up.
    AwardCoins { amount: Coins },

    // ── Navigation ────────────────────────────────
    EnterGameplay,
    ReturnToLobby,

    // ── Session ───────────────────────────────────
    StartGame { difficulty: f64 },
    TogglePause,
    RestartGame,
    AddScore { points: i64 },
    ReportMiss,
    Tick { dt: SessionTime },
}

/// What a command produced. Fields that do not apply stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry:  Option<EntryOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily:  Option<DailyRewardOutcome>,
}

impl CommandResult {
    pub fn events(events: Vec<GameEvent>) -> Self {
        Self { events, ..Self::default() }
    }
}
