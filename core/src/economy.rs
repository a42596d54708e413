//! Economy service: the only writer of coins, attempts and the time-gated
//! rewards.
//!
//! The lobby-side Economy Record and the gameplay-side Session Record are two
//! projections of one balance. Every mutation here updates both and flushes
//! them in a single store transaction before returning, so their `coins` and
//! `remainingAttempts` never differ once the Session Record exists.
//!
//! The sync operations exist for the boundaries between save contexts, where
//! another writer may have touched one of the documents directly. A mutation
//! that finds the Session document changed behind its back folds the
//! gameplay-side delta into the balance instead of overwriting it.

use crate::{
    config::{EconomyConfig, StreakPolicy},
    error::{ArcadeError, ArcadeResult},
    ledger::{EconomyRecord, SessionRecord},
    store::LedgerStore,
    types::{Coins, Score},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// `charged` is true when the entry fee bought a fresh set of attempts.
    Entered { charged: bool },
    InsufficientFunds { needed: Coins, available: Coins },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Remaining(u32),
    /// No attempts left; the player has to go back to the lobby and pay.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    /// First check ever: the refill clock was started.
    Scheduled { at: DateTime<Utc> },
    NotDue { at: DateTime<Utc> },
    Granted { amount: Coins, next: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DailyRewardOutcome {
    Claimed { amount: Coins, day_index: u32 },
    AlreadyClaimed,
}

pub struct EconomyService {
    config: EconomyConfig,
    store: LedgerStore,
    economy: EconomyRecord,
    session: Option<SessionRecord>,
    /// Shared `(coins, remainingAttempts)` last read from or written to the
    /// Session document by this service.
    agreed: Option<(Coins, u32)>,
}

impl EconomyService {
    /// Load both documents, creating the Economy Record on first run.
    pub fn open(store: LedgerStore, config: EconomyConfig) -> ArcadeResult<Self> {
        config.validate()?;
        let economy = store.load_economy(&config)?;
        let session = store.load_session()?;
        log::info!(
            "economy opened: coins={} attempts={} day={} session_record={}",
            economy.coins,
            economy.remaining_attempts,
            economy.login_day_index,
            session.is_some()
        );
        Ok(Self {
            config,
            store,
            economy,
            agreed: session.as_ref().map(shared_fields),
            session,
        })
    }

    // ── Entry and attempts ────────────────────────────────────────

    pub fn try_enter_game(&mut self) -> ArcadeResult<EntryOutcome> {
        if self.economy.remaining_attempts > 0 {
            self.ensure_session();
            self.persist()?;
            log::info!(
                "entered game with {} attempts left",
                self.economy.remaining_attempts
            );
            return Ok(EntryOutcome::Entered { charged: false });
        }

        let fee = self.config.entry_fee;
        if self.economy.coins < fee {
            log::info!(
                "entry refused: {} coins, fee is {fee}",
                self.economy.coins
            );
            return Ok(EntryOutcome::InsufficientFunds {
                needed: fee,
                available: self.economy.coins,
            });
        }

        self.economy.coins -= fee;
        self.economy.remaining_attempts = self.config.max_attempts;
        self.ensure_session();
        self.persist()?;
        log::info!(
            "entry fee {fee} paid, coins now {}, attempts reset to {}",
            self.economy.coins,
            self.economy.remaining_attempts
        );
        Ok(EntryOutcome::Entered { charged: true })
    }

    /// Spend one attempt after a lost session. Never goes below zero.
    pub fn consume_attempt(&mut self) -> ArcadeResult<AttemptOutcome> {
        self.economy.remaining_attempts = self.economy.remaining_attempts.saturating_sub(1);
        self.persist()?;

        let left = self.economy.remaining_attempts;
        log::info!("attempt consumed, {left} remaining");
        if left == 0 {
            Ok(AttemptOutcome::Exhausted)
        } else {
            Ok(AttemptOutcome::Remaining(left))
        }
    }

    // ── Coins and scores ──────────────────────────────────────────

    /// Credit coins to both projections. Returns the new balance.
    pub fn award_coins(&mut self, amount: Coins) -> ArcadeResult<Coins> {
        if amount == 0 {
            return Err(ArcadeError::InvalidAmount { amount });
        }
        self.economy.coins = self.economy.coins.saturating_add(amount);
        self.persist()?;
        log::info!("awarded {amount} coins, balance {}", self.economy.coins);
        Ok(self.economy.coins)
    }

    /// Keep `candidate` if it beats the stored high score. Returns true on change.
    pub fn record_high_score(&mut self, candidate: Score) -> ArcadeResult<bool> {
        if candidate <= self.high_score() {
            return Ok(false);
        }
        self.ensure_session();
        if let Some(session) = self.session.as_mut() {
            session.high_score = candidate;
        }
        self.persist()?;
        log::info!("new high score {candidate}");
        Ok(true)
    }

    // ── Time-gated rewards ────────────────────────────────────────

    /// Grant the hourly refill if it is due. At most one refill per call,
    /// however long the game was closed.
    pub fn run_hourly_refill(&mut self, now: DateTime<Utc>) -> ArcadeResult<RefillOutcome> {
        let interval = Duration::seconds(self.config.refill_interval_secs);

        match self.economy.next_refill_time {
            None => {
                let at = now + interval;
                self.economy.next_refill_time = Some(at);
                self.persist()?;
                log::debug!("refill clock started, first refill at {at}");
                Ok(RefillOutcome::Scheduled { at })
            }
            Some(at) if now < at => Ok(RefillOutcome::NotDue { at }),
            Some(_) => {
                let amount = self.config.refill_amount;
                let next = now + interval;
                self.economy.coins = self.economy.coins.saturating_add(amount);
                self.economy.next_refill_time = Some(next);
                self.persist()?;
                log::info!(
                    "hourly refill +{amount}, balance {}, next at {next}",
                    self.economy.coins
                );
                Ok(RefillOutcome::Granted { amount, next })
            }
        }
    }

    pub fn claim_daily_reward(&mut self, today: NaiveDate) -> ArcadeResult<DailyRewardOutcome> {
        if !self.can_claim_daily(today) {
            log::debug!("daily reward already claimed on {today}");
            return Ok(DailyRewardOutcome::AlreadyClaimed);
        }

        let day_index = self.current_day_index();
        let amount = self.config.daily_rewards[day_index as usize];
        self.economy.coins = self.economy.coins.saturating_add(amount);
        self.economy.last_claim_date = Some(today);
        self.economy.login_day_index = self.next_day_index(day_index);
        self.persist()?;

        log::info!(
            "daily reward day {} claimed: +{amount}, balance {}",
            day_index + 1,
            self.economy.coins
        );
        Ok(DailyRewardOutcome::Claimed { amount, day_index })
    }

    pub fn can_claim_daily(&self, today: NaiveDate) -> bool {
        self.economy.last_claim_date != Some(today)
    }

    /// What a claim on `today` would pay, or `None` if already claimed.
    pub fn daily_reward_preview(&self, today: NaiveDate) -> Option<Coins> {
        self.can_claim_daily(today)
            .then(|| self.config.daily_rewards[self.current_day_index() as usize])
    }

    fn current_day_index(&self) -> u32 {
        let last = self.config.daily_rewards.len().saturating_sub(1) as u32;
        self.economy.login_day_index.min(last)
    }

    fn next_day_index(&self, day_index: u32) -> u32 {
        let len = self.config.daily_rewards.len() as u32;
        match self.config.streak_policy {
            StreakPolicy::Wrap => (day_index + 1) % len,
            StreakPolicy::Clamp => (day_index + 1).min(len - 1),
        }
    }

    // ── Context synchronisation ───────────────────────────────────

    /// Lobby → gameplay: the stored Economy Record is authoritative. Creates
    /// the Session Record if it does not exist yet.
    pub fn sync_to_session(&mut self) -> ArcadeResult<()> {
        self.economy = self.store.load_economy(&self.config)?;
        let mut session = self
            .store
            .load_session()?
            .unwrap_or_else(|| SessionRecord::from_economy(&self.economy));
        self.agreed = Some(shared_fields(&session));
        session.coins = self.economy.coins;
        session.remaining_attempts = self.economy.remaining_attempts;
        self.session = Some(session);
        self.persist()?;
        log::info!("synced lobby → session: coins={}", self.economy.coins);
        Ok(())
    }

    /// Gameplay → lobby: the stored Session Record is authoritative.
    /// Nothing to reconcile before the first game entry.
    pub fn sync_from_session(&mut self) -> ArcadeResult<()> {
        let Some(session) = self.store.load_session()? else {
            log::debug!("no session record yet, nothing to sync");
            return Ok(());
        };
        self.economy = self.store.load_economy(&self.config)?;
        self.economy.coins = session.coins;
        self.economy.remaining_attempts = session.remaining_attempts;
        self.agreed = Some(shared_fields(&session));
        self.session = Some(session);
        self.persist()?;
        log::info!("synced session → lobby: coins={}", self.economy.coins);
        Ok(())
    }

    // ── Read-only views ───────────────────────────────────────────

    pub fn coins(&self) -> Coins {
        self.economy.coins
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.economy.remaining_attempts
    }

    pub fn high_score(&self) -> Score {
        self.session.as_ref().map_or(0, |s| s.high_score)
    }

    pub fn login_day_index(&self) -> u32 {
        self.economy.login_day_index
    }

    pub fn last_claim_date(&self) -> Option<NaiveDate> {
        self.economy.last_claim_date
    }

    pub fn next_refill_time(&self) -> Option<DateTime<Utc>> {
        self.economy.next_refill_time
    }

    pub fn economy(&self) -> &EconomyRecord {
        &self.economy
    }

    pub fn session(&self) -> Option<&SessionRecord> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    // ── Internals ─────────────────────────────────────────────────

    fn ensure_session(&mut self) {
        if self.session.is_none() {
            log::info!("creating session record");
            self.session = Some(SessionRecord::from_economy(&self.economy));
        }
    }

    /// Copy the shared fields into the session projection and flush.
    ///
    /// If the stored Session document no longer holds what this service last
    /// agreed with it, the gameplay side wrote it directly. Its changes since
    /// the agreement are applied on top of the lobby-side balance first, so
    /// neither side's credits are lost.
    fn persist(&mut self) -> ArcadeResult<()> {
        let Some(session) = self.session.as_mut() else {
            return self.store.save_economy(&self.economy);
        };

        if let Some(stored) = self.store.load_session()? {
            let theirs = shared_fields(&stored);
            let base = self.agreed.unwrap_or(theirs);
            session.high_score = session.high_score.max(stored.high_score);
            if theirs != base {
                self.economy.coins = merge(self.economy.coins, base.0, theirs.0);
                self.economy.remaining_attempts = merge(
                    u64::from(self.economy.remaining_attempts),
                    u64::from(base.1),
                    u64::from(theirs.1),
                )
                .try_into()
                .unwrap_or(u32::MAX);
                log::info!(
                    "session document changed since last write ({} → {} coins), merged: balance {}",
                    base.0,
                    theirs.0,
                    self.economy.coins
                );
            }
        }

        session.coins = self.economy.coins;
        session.remaining_attempts = self.economy.remaining_attempts;
        self.store.save_both(&self.economy, session)?;
        self.agreed = Some(shared_fields(session));
        Ok(())
    }
}

fn shared_fields(session: &SessionRecord) -> (Coins, u32) {
    (session.coins, session.remaining_attempts)
}

/// Three-way merge: apply the change `base → theirs` to `ours`.
fn merge(ours: u64, base: u64, theirs: u64) -> u64 {
    ours.saturating_add(theirs.saturating_sub(base))
        .saturating_sub(base.saturating_sub(theirs))
}
