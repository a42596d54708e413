//! The arcade engine. It wires the ledger store, the economy service and the
//! session controller, and exposes the operations Presentation calls.
//!
//! Nothing is looked up by name at runtime: the engine constructs each
//! component once and hands the economy to the controller explicitly on
//! every call that needs it.
//!
//! FRAME LOOP: Presentation calls `update(dt, now)` once per frame.
//!   1. Session timers advance by `dt` (frozen while paused).
//!   2. The hourly refill is checked against the wall clock `now`
//!      (never frozen).

use crate::{
    command::{CommandResult, PlayerCommand},
    config::ArcadeConfig,
    economy::{DailyRewardOutcome, EconomyService, EntryOutcome, RefillOutcome},
    error::ArcadeResult,
    event::GameEvent,
    session::{SessionController, SessionState},
    snapshot::ArcadeSnapshot,
    store::LedgerStore,
    types::{Coins, Score, SessionTime},
};
use chrono::{DateTime, NaiveDate, Utc};

pub struct ArcadeEngine {
    pub economy: EconomyService,
    pub session: SessionController,
}

impl ArcadeEngine {
    pub fn new(store: LedgerStore, config: ArcadeConfig, seed: u64) -> ArcadeResult<Self> {
        config.validate()?;
        store.migrate()?;
        let economy = EconomyService::open(store, config.economy)?;
        let session = SessionController::new(config.session, seed);
        Ok(Self { economy, session })
    }

    /// Open (or create) the ledger database at `path`.
    pub fn open(path: &str, config: ArcadeConfig, seed: u64) -> ArcadeResult<Self> {
        Self::new(LedgerStore::open(path)?, config, seed)
    }

    /// Engine on a private in-memory ledger with the default test config.
    pub fn build_test(seed: u64) -> ArcadeResult<Self> {
        Self::new(LedgerStore::in_memory()?, ArcadeConfig::default_test(), seed)
    }

    // ── Lobby ─────────────────────────────────────────────────────

    pub fn try_enter_game(&mut self) -> ArcadeResult<EntryOutcome> {
        self.economy.try_enter_game()
    }

    pub fn claim_daily_reward(&mut self, today: NaiveDate) -> ArcadeResult<DailyRewardOutcome> {
        self.economy.claim_daily_reward(today)
    }

    pub fn run_hourly_refill(&mut self, now: DateTime<Utc>) -> ArcadeResult<RefillOutcome> {
        self.economy.run_hourly_refill(now)
    }

    // ── Navigation boundaries ─────────────────────────────────────

    /// Lobby → gameplay.
    pub fn enter_gameplay(&mut self) -> ArcadeResult<()> {
        self.economy.sync_to_session()
    }

    /// Gameplay → lobby. Drops whatever session was in progress.
    pub fn return_to_lobby(&mut self) -> ArcadeResult<Vec<GameEvent>> {
        let events = self.session.restart_game();
        self.economy.sync_from_session()?;
        Ok(events)
    }

    // ── Session ───────────────────────────────────────────────────

    pub fn start_game(&mut self, difficulty: f64) -> Vec<GameEvent> {
        self.session.start_game(difficulty, &self.economy)
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        self.session.toggle_pause()
    }

    pub fn restart_game(&mut self) -> Vec<GameEvent> {
        self.session.restart_game()
    }

    pub fn add_score(&mut self, points: i64) -> ArcadeResult<Vec<GameEvent>> {
        self.session.add_score(points, &mut self.economy)
    }

    pub fn report_miss(&mut self) -> ArcadeResult<Vec<GameEvent>> {
        self.session.report_miss(&mut self.economy)
    }

    /// One frame: session time plus the wall-clock refill check.
    pub fn update(&mut self, dt: SessionTime, now: DateTime<Utc>) -> ArcadeResult<Vec<GameEvent>> {
        let mut events = self.session.tick(dt);
        if let RefillOutcome::Granted { amount, .. } = self.economy.run_hourly_refill(now)? {
            events.push(GameEvent::RefillGranted {
                amount,
                balance: self.economy.coins(),
            });
        }
        Ok(events)
    }

    /// Run a serialised command. `ClaimDailyReward` uses the UTC calendar
    /// date of `now`; `Tick` runs a full `update`.
    pub fn apply(&mut self, command: PlayerCommand, now: DateTime<Utc>) -> ArcadeResult<CommandResult> {
        log::debug!("command: {command:?}");
        let result = match command {
            PlayerCommand::TryEnterGame => CommandResult {
                entry: Some(self.try_enter_game()?),
                ..CommandResult::default()
            },
            PlayerCommand::ClaimDailyReward => CommandResult {
                daily: Some(self.claim_daily_reward(now.date_naive())?),
                ..CommandResult::default()
            },
            PlayerCommand::AwardCoins { amount } => {
                self.economy.award_coins(amount)?;
                CommandResult::default()
            }
            PlayerCommand::EnterGameplay => {
                self.enter_gameplay()?;
                CommandResult::default()
            }
            PlayerCommand::ReturnToLobby => CommandResult::events(self.return_to_lobby()?),
            PlayerCommand::StartGame { difficulty } => {
                CommandResult::events(self.start_game(difficulty))
            }
            PlayerCommand::TogglePause => CommandResult::events(self.toggle_pause()),
            PlayerCommand::RestartGame => CommandResult::events(self.restart_game()),
            PlayerCommand::AddScore { points } => CommandResult::events(self.add_score(points)?),
            PlayerCommand::ReportMiss => CommandResult::events(self.report_miss()?),
            PlayerCommand::Tick { dt } => CommandResult::events(self.update(dt, now)?),
        };
        Ok(result)
    }

    // ── Read-only views ───────────────────────────────────────────

    pub fn coins(&self) -> Coins {
        self.economy.coins()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.economy.remaining_attempts()
    }

    pub fn high_score(&self) -> Score {
        self.economy.high_score()
    }

    pub fn score(&self) -> Score {
        self.session.score()
    }

    pub fn level(&self) -> u32 {
        self.session.level()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn snapshot(&self) -> ArcadeSnapshot {
        ArcadeSnapshot {
            coins:              self.economy.coins(),
            remaining_attempts: self.economy.remaining_attempts(),
            high_score:         self.economy.high_score(),
            login_day_index:    self.economy.login_day_index(),
            last_claim_date:    self.economy.last_claim_date(),
            next_refill_time:   self.economy.next_refill_time(),
            state:              self.session.state(),
            score:              self.session.score(),
            level:              self.session.level(),
            spawn_interval:     self.session.spawn_interval(),
            countdown:          self.session.countdown(),
            level_banner:       self.session.level_banner(),
            session_time:       self.session.session_time(),
        }
    }
}
