//! Session-time timers.
//!
//! Every wait in a play session (countdown steps, the spawn cadence, the
//! level-up banner, the delayed return to the lobby) is a pending entry here.
//! Entries are stamped with the scheduler's current `CancelToken`.
//! `cancel_all` moves to a new token, which makes every entry stamped with an
//! older one stale, and stale entries are dropped instead of fired. A session
//! reset therefore can never receive a callback that was armed for the
//! session before it.

use crate::types::SessionTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Next countdown display (3 → 2 → 1 → GO → play).
    CountdownStep,
    /// Launch the next target.
    Spawn,
    /// Hide the level-up banner.
    LevelBannerEnd,
    /// Send the player back to the lobby after the last attempt.
    LobbyReturn,
}

/// Generation stamp shared by every timer armed between two cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CancelToken(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub kind: TimerKind,
    /// When the timer was due; rescheduling from here avoids drift.
    pub due:  SessionTime,
}

#[derive(Debug, Clone)]
struct Pending {
    seq:   u64,
    kind:  TimerKind,
    due:   SessionTime,
    token: CancelToken,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pending:  Vec<Pending>,
    next_seq: u64,
    token:    CancelToken,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            pending:  Vec::new(),
            next_seq: 0,
            token:    CancelToken(0),
        }
    }

    /// Arm a timer due at absolute session time `due`.
    pub fn schedule(&mut self, due: SessionTime, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { seq, kind, due, token: self.token });
        log::debug!("timer #{seq} armed: {kind:?} at t={due:.2}");
    }

    pub fn cancel_kind(&mut self, kind: TimerKind) {
        self.pending.retain(|p| p.kind != kind);
    }

    /// Invalidate every armed timer. Stale entries are swept on the next
    /// `pop_due`.
    pub fn cancel_all(&mut self) {
        self.token = CancelToken(self.token.0 + 1);
        log::debug!("timers cancelled, epoch now {}", self.token.0);
    }

    /// Take the earliest live timer due at or before `now`.
    /// Ties fire in arming order.
    pub fn pop_due(&mut self, now: SessionTime) -> Option<Fired> {
        let token = self.token;
        self.pending.retain(|p| p.token == token);

        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;

        let p = self.pending.swap_remove(index);
        Some(Fired { kind: p.kind, due: p.due })
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind && p.token == self.token)
    }

    pub fn len(&self) -> usize {
        self.pending.iter().filter(|p| p.token == self.token).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
