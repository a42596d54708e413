//! Session controller: the play-session state machine.
//!
//! STATES:
//!   Idle → Countdown → Active ⇄ Paused → Won | Lost → Idle
//!
//! RULES:
//!   - Only this module writes score, level and spawn cadence.
//!   - Every wait is a `Scheduler` timer in session time; a reset cancels
//!     all of them at once, so nothing armed for an old session fires into
//!     a new one.
//!   - Pause freezes session time only. Wall-clock economy timers keep
//!     running (see `EconomyService::run_hourly_refill`).
//!   - A won session never consumes an attempt, whatever is reported later.
//!   - Coins, attempts and the high score go through `EconomyService`.

use crate::{
    clock::SessionClock,
    config::SessionConfig,
    economy::{AttemptOutcome, EconomyService},
    error::ArcadeResult,
    event::GameEvent,
    rng::SpawnRng,
    spawner::SpawnSchedule,
    timer::{Fired, Scheduler, TimerKind},
    types::{Score, SessionId, SessionTime},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Countdown,
    Active,
    Paused,
    Won,
    Lost,
}

/// What the start countdown currently shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "display", content = "value", rename_all = "snake_case")]
pub enum CountdownDisplay {
    Number(u32),
    Go,
}

pub struct SessionController {
    config:           SessionConfig,
    seed:             u64,
    sessions_started: u64,
    // Never `Paused`; pause is a clock flag layered over Countdown/Active.
    phase:            SessionState,
    clock:            SessionClock,
    timers:           Scheduler,
    spawner:          SpawnSchedule,
    session_id:       Option<SessionId>,
    difficulty:       f64,
    score:            Score,
    level:            u32,
    high_score:       Score,
    won:              bool,
    countdown:        Option<CountdownDisplay>,
    level_banner:     Option<u32>,
}

impl SessionController {
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let spawner = SpawnSchedule::new(&config, SpawnRng::for_session(seed, 0));
        Self {
            config,
            seed,
            sessions_started: 0,
            phase: SessionState::Idle,
            clock: SessionClock::new(),
            timers: Scheduler::new(),
            spawner,
            session_id: None,
            difficulty: 1.0,
            score: 0,
            level: 1,
            high_score: 0,
            won: false,
            countdown: None,
            level_banner: None,
        }
    }

    // ── Transitions ───────────────────────────────────────────────

    /// Idle → Countdown. Ignored unless idle, the difficulty is a positive
    /// number and the economy still has an attempt to spend.
    pub fn start_game(&mut self, difficulty: f64, economy: &EconomyService) -> Vec<GameEvent> {
        if self.phase != SessionState::Idle {
            log::warn!("start_game ignored: session is {:?}", self.state());
            return vec![];
        }
        if !(difficulty.is_finite() && difficulty > 0.0) {
            log::warn!("start_game ignored: difficulty {difficulty} is not a positive number");
            return vec![];
        }
        if economy.remaining_attempts() == 0 {
            log::info!("start_game ignored: no attempts left, entry fee required");
            return vec![];
        }

        self.reset_runtime();
        self.sessions_started += 1;
        self.spawner
            .reset(SpawnRng::for_session(self.seed, self.sessions_started));
        self.difficulty = difficulty;
        self.high_score = economy.high_score();

        let session_id = uuid::Uuid::new_v4().to_string();
        self.session_id = Some(session_id.clone());
        self.phase = SessionState::Countdown;
        log::info!("session {session_id} starting at difficulty {difficulty}");

        let mut events = vec![
            GameEvent::SessionStarted {
                session_id,
                difficulty,
                high_score: self.high_score,
            },
            GameEvent::ScoreChanged { score: 0 },
        ];
        if self.config.countdown_from > 0 {
            let n = self.config.countdown_from;
            self.countdown = Some(CountdownDisplay::Number(n));
            events.push(GameEvent::CountdownTick { remaining: n });
        } else {
            self.countdown = Some(CountdownDisplay::Go);
            events.push(GameEvent::CountdownGo);
        }
        self.timers.schedule(
            self.clock.now + self.config.countdown_step,
            TimerKind::CountdownStep,
        );
        events
    }

    /// Active/Countdown ⇄ Paused.
    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        if !matches!(self.phase, SessionState::Countdown | SessionState::Active) {
            log::warn!("toggle_pause ignored: session is {:?}", self.phase);
            return vec![];
        }
        if self.clock.paused {
            self.clock.resume();
            log::info!("session resumed at t={:.2}", self.clock.now);
            vec![GameEvent::Resumed]
        } else {
            self.clock.pause();
            log::info!("session paused at t={:.2}", self.clock.now);
            vec![GameEvent::Paused]
        }
    }

    /// Back to Idle from any state. Cancels every pending wait. Persisted
    /// economy fields are untouched.
    pub fn restart_game(&mut self) -> Vec<GameEvent> {
        log::info!("session reset from {:?}", self.state());
        self.reset_runtime();
        vec![GameEvent::SessionReset]
    }

    /// A target was hit. Only counts while actively playing.
    pub fn add_score(
        &mut self,
        points: i64,
        economy: &mut EconomyService,
    ) -> ArcadeResult<Vec<GameEvent>> {
        if self.state() != SessionState::Active {
            log::debug!("add_score({points}) ignored: session is {:?}", self.state());
            return Ok(vec![]);
        }

        self.score = self.score.saturating_add(points);
        let mut events = vec![GameEvent::ScoreChanged { score: self.score }];

        let max_level = self.config.max_level();
        while self.level < max_level
            && self.score >= self.config.level_thresholds[(self.level - 1) as usize]
        {
            self.level_up(&mut events);
        }

        if self.level == max_level && self.score >= self.config.win_score() && !self.won {
            self.win(economy, &mut events)?;
        }
        Ok(events)
    }

    /// A scoring target left the field unclicked. Ends the session as lost
    /// unless it was already won.
    pub fn report_miss(&mut self, economy: &mut EconomyService) -> ArcadeResult<Vec<GameEvent>> {
        if self.won {
            log::debug!("report_miss ignored: session already won");
            return Ok(vec![]);
        }
        if self.state() != SessionState::Active {
            log::debug!("report_miss ignored: session is {:?}", self.state());
            return Ok(vec![]);
        }

        self.phase = SessionState::Lost;
        self.stop_spawning();

        let mut events = Vec::new();
        self.check_high_score(economy, &mut events)?;

        let outcome = economy.consume_attempt()?;
        events.insert(
            0,
            GameEvent::Lost {
                score: self.score,
                attempts_remaining: economy.remaining_attempts(),
            },
        );
        log::info!(
            "session {} lost with score {}, {} attempts left",
            self.session_id.as_deref().unwrap_or("-"),
            self.score,
            economy.remaining_attempts()
        );

        if outcome == AttemptOutcome::Exhausted {
            events.push(GameEvent::AttemptsExhausted);
            self.timers.schedule(
                self.clock.now + self.config.lobby_return_delay,
                TimerKind::LobbyReturn,
            );
        }
        Ok(events)
    }

    /// Advance session time by `dt` and fire every timer that comes due.
    /// Does nothing while paused.
    pub fn tick(&mut self, dt: SessionTime) -> Vec<GameEvent> {
        if self.clock.paused {
            return vec![];
        }
        let now = self.clock.advance(dt);

        let mut events = Vec::new();
        while let Some(fired) = self.timers.pop_due(now) {
            self.on_timer(fired, &mut events);
        }
        events
    }

    // ── Timer handlers ────────────────────────────────────────────

    fn on_timer(&mut self, fired: Fired, events: &mut Vec<GameEvent>) {
        log::debug!("timer {:?} fired at t={:.2}", fired.kind, fired.due);
        match fired.kind {
            TimerKind::CountdownStep => self.advance_countdown(fired.due, events),
            TimerKind::Spawn => {
                if self.phase != SessionState::Active || !self.spawner.is_running() {
                    return;
                }
                let kind = self.spawner.pick();
                events.push(GameEvent::TargetSpawned {
                    kind:   kind.name.clone(),
                    points: kind.points,
                    hazard: kind.hazard,
                });
                let next = fired.due + self.spawner.interval();
                self.timers.schedule(next, TimerKind::Spawn);
            }
            TimerKind::LevelBannerEnd => {
                self.level_banner = None;
                events.push(GameEvent::LevelBannerHidden);
            }
            TimerKind::LobbyReturn => {
                log::info!("attempts exhausted, returning to lobby");
                self.reset_runtime();
                events.push(GameEvent::ReturnToLobby);
            }
        }
    }

    fn advance_countdown(&mut self, due: SessionTime, events: &mut Vec<GameEvent>) {
        if self.phase != SessionState::Countdown {
            return;
        }
        match self.countdown {
            Some(CountdownDisplay::Number(n)) if n > 1 => {
                self.countdown = Some(CountdownDisplay::Number(n - 1));
                events.push(GameEvent::CountdownTick { remaining: n - 1 });
                self.timers
                    .schedule(due + self.config.countdown_step, TimerKind::CountdownStep);
            }
            Some(CountdownDisplay::Number(_)) => {
                self.countdown = Some(CountdownDisplay::Go);
                events.push(GameEvent::CountdownGo);
                self.timers
                    .schedule(due + self.config.countdown_step, TimerKind::CountdownStep);
            }
            Some(CountdownDisplay::Go) | None => self.begin_play(due, events),
        }
    }

    fn begin_play(&mut self, at: SessionTime, events: &mut Vec<GameEvent>) {
        self.countdown = None;
        self.phase = SessionState::Active;
        let interval = self.spawner.start(self.difficulty);
        self.timers.schedule(at + interval, TimerKind::Spawn);
        log::info!("play started, spawn interval {interval:.2}");
        events.push(GameEvent::PlayStarted { spawn_interval: interval });
    }

    // ── Internals ─────────────────────────────────────────────────

    fn level_up(&mut self, events: &mut Vec<GameEvent>) {
        self.level += 1;
        let interval = self.spawner.speed_up();

        self.level_banner = Some(self.level);
        self.timers.cancel_kind(TimerKind::LevelBannerEnd);
        self.timers.schedule(
            self.clock.now + self.config.level_banner_duration,
            TimerKind::LevelBannerEnd,
        );

        log::info!("level {} reached, spawn interval {interval:.2}", self.level);
        events.push(GameEvent::LevelUp {
            level: self.level,
            spawn_interval: interval,
        });
    }

    fn win(&mut self, economy: &mut EconomyService, events: &mut Vec<GameEvent>) -> ArcadeResult<()> {
        self.won = true;
        self.phase = SessionState::Won;
        self.stop_spawning();

        let reward = economy.config().win_reward;
        if reward > 0 {
            economy.award_coins(reward)?;
        }
        log::info!(
            "session {} won with score {}, rewarded {reward} coins",
            self.session_id.as_deref().unwrap_or("-"),
            self.score
        );
        events.push(GameEvent::Won {
            score: self.score,
            reward,
        });
        self.check_high_score(economy, events)
    }

    fn check_high_score(
        &mut self,
        economy: &mut EconomyService,
        events: &mut Vec<GameEvent>,
    ) -> ArcadeResult<()> {
        if economy.record_high_score(self.score)? {
            self.high_score = self.score;
            events.push(GameEvent::HighScoreBeaten {
                high_score: self.score,
            });
        }
        Ok(())
    }

    fn stop_spawning(&mut self) {
        self.spawner.stop();
        self.timers.cancel_kind(TimerKind::Spawn);
    }

    fn reset_runtime(&mut self) {
        self.timers.cancel_all();
        self.clock.reset();
        self.spawner.rewind();
        self.phase = SessionState::Idle;
        self.session_id = None;
        self.score = 0;
        self.level = 1;
        self.won = false;
        self.countdown = None;
        self.level_banner = None;
    }

    // ── Read-only views ───────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match self.phase {
            SessionState::Countdown | SessionState::Active if self.clock.paused => {
                SessionState::Paused
            }
            phase => phase,
        }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// High score as of session start, raised when this session beats it.
    pub fn high_score(&self) -> Score {
        self.high_score
    }

    pub fn spawn_interval(&self) -> SessionTime {
        self.spawner.interval()
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionState::Active
    }

    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn countdown(&self) -> Option<CountdownDisplay> {
        self.countdown
    }

    pub fn level_banner(&self) -> Option<u32> {
        self.level_banner
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn session_time(&self) -> SessionTime {
        self.clock.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
