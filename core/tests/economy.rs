//! Economy service tests: entry fees, attempts, coins, refill, high score.

use arcade_core::{
    config::EconomyConfig,
    economy::{AttemptOutcome, EconomyService, EntryOutcome, RefillOutcome},
    error::ArcadeError,
    ledger::EconomyRecord,
    store::LedgerStore,
};
use chrono::{Duration, TimeZone, Utc};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Economy service over a fresh in-memory ledger seeded with `coins` and `attempts`.
fn economy_with(coins: u64, attempts: u32) -> EconomyService {
    init_logging();
    let store = LedgerStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let record = EconomyRecord {
        coins,
        remaining_attempts: attempts,
        ..EconomyRecord::default()
    };
    store.save_economy(&record).expect("seed economy");
    EconomyService::open(store, EconomyConfig::default()).expect("open economy")
}

#[test]
fn first_run_creates_default_economy_record() {
    init_logging();
    let store = LedgerStore::in_memory().unwrap();
    store.migrate().unwrap();

    let economy = EconomyService::open(store, EconomyConfig::default()).unwrap();

    assert_eq!(economy.coins(), 500);
    assert_eq!(economy.remaining_attempts(), 3);
    assert_eq!(economy.login_day_index(), 0);
    assert!(economy.session().is_none(), "session record is created lazily");
    assert!(economy.store().document("economy").unwrap().is_some(), "defaults written immediately");
}

#[test]
fn entry_refused_without_attempts_or_funds() {
    let mut economy = economy_with(50, 0);

    let outcome = economy.try_enter_game().unwrap();

    assert_eq!(outcome, EntryOutcome::InsufficientFunds { needed: 100, available: 50 });
    assert_eq!(economy.coins(), 50);
    assert_eq!(economy.remaining_attempts(), 0);
    assert!(economy.session().is_none());
}

#[test]
fn entry_fee_buys_a_fresh_set_of_attempts() {
    let mut economy = economy_with(150, 0);

    let outcome = economy.try_enter_game().unwrap();

    assert_eq!(outcome, EntryOutcome::Entered { charged: true });
    assert_eq!(economy.coins(), 50);
    assert_eq!(economy.remaining_attempts(), 3);

    let session = economy.session().expect("session record created on entry");
    assert_eq!(session.coins, 50);
    assert_eq!(session.remaining_attempts, 3);
}

#[test]
fn entry_with_attempts_left_is_free() {
    let mut economy = economy_with(30, 2);

    let outcome = economy.try_enter_game().unwrap();

    assert_eq!(outcome, EntryOutcome::Entered { charged: false });
    assert_eq!(economy.coins(), 30);
    assert_eq!(economy.remaining_attempts(), 2);
}

#[test]
fn exact_fee_is_enough() {
    let mut economy = economy_with(100, 0);
    assert_eq!(
        economy.try_enter_game().unwrap(),
        EntryOutcome::Entered { charged: true }
    );
    assert_eq!(economy.coins(), 0);
}

#[test]
fn consume_attempt_counts_down_and_signals_exhaustion() {
    let mut economy = economy_with(0, 2);

    assert_eq!(economy.consume_attempt().unwrap(), AttemptOutcome::Remaining(1));
    assert_eq!(economy.consume_attempt().unwrap(), AttemptOutcome::Exhausted);
    assert_eq!(economy.remaining_attempts(), 0);
}

#[test]
fn consume_attempt_never_goes_below_zero() {
    let mut economy = economy_with(0, 0);

    assert_eq!(economy.consume_attempt().unwrap(), AttemptOutcome::Exhausted);
    assert_eq!(economy.remaining_attempts(), 0);

    let stored = economy
        .store()
        .load_economy(&EconomyConfig::default())
        .unwrap();
    assert_eq!(stored.remaining_attempts, 0);
}

#[test]
fn award_coins_updates_both_records() {
    let mut economy = economy_with(100, 3);
    economy.try_enter_game().unwrap();

    let balance = economy.award_coins(200).unwrap();

    assert_eq!(balance, 300);
    assert_eq!(economy.session().unwrap().coins, 300);
    let stored = economy.store().load_session().unwrap().unwrap();
    assert_eq!(stored.coins, 300);
}

#[test]
fn award_of_zero_coins_is_rejected() {
    let mut economy = economy_with(100, 3);
    let err = economy.award_coins(0).unwrap_err();
    assert!(matches!(err, ArcadeError::InvalidAmount { amount: 0 }));
    assert_eq!(economy.coins(), 100);
}

#[test]
fn high_score_never_decreases() {
    let mut economy = economy_with(0, 3);

    assert!(economy.record_high_score(120).unwrap());
    assert!(!economy.record_high_score(80).unwrap());
    assert!(!economy.record_high_score(120).unwrap());

    assert_eq!(economy.high_score(), 120);
    assert_eq!(economy.store().load_session().unwrap().unwrap().high_score, 120);
}

#[test]
fn negative_score_never_becomes_high_score() {
    let mut economy = economy_with(0, 3);
    assert!(!economy.record_high_score(-15).unwrap());
    assert_eq!(economy.high_score(), 0);
}

#[test]
fn first_refill_check_only_schedules() {
    let mut economy = economy_with(0, 3);
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

    let outcome = economy.run_hourly_refill(now).unwrap();

    assert_eq!(outcome, RefillOutcome::Scheduled { at: now + Duration::hours(1) });
    assert_eq!(economy.coins(), 0);
    assert_eq!(economy.next_refill_time(), Some(now + Duration::hours(1)));
}

#[test]
fn refill_not_granted_before_due() {
    let mut economy = economy_with(0, 3);
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    economy.run_hourly_refill(start).unwrap();

    let outcome = economy.run_hourly_refill(start + Duration::minutes(59)).unwrap();

    assert_eq!(outcome, RefillOutcome::NotDue { at: start + Duration::hours(1) });
    assert_eq!(economy.coins(), 0);
}

#[test]
fn refill_granted_once_when_due_and_rescheduled_from_now() {
    let mut economy = economy_with(0, 3);
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    economy.run_hourly_refill(start).unwrap();

    let later = start + Duration::hours(5);
    let outcome = economy.run_hourly_refill(later).unwrap();

    assert_eq!(
        outcome,
        RefillOutcome::Granted { amount: 100, next: later + Duration::hours(1) }
    );
    assert_eq!(economy.coins(), 100, "catch-up is single-shot");

    let again = economy.run_hourly_refill(later).unwrap();
    assert!(matches!(again, RefillOutcome::NotDue { .. }));
    assert_eq!(economy.coins(), 100);
}

#[test]
fn mutations_survive_reopen() {
    init_logging();
    let store = LedgerStore::shared_memory("economy-reopen").unwrap();
    store.migrate().unwrap();
    let keep_alive = store.reopen().unwrap();

    let mut economy = EconomyService::open(store, EconomyConfig::default()).unwrap();
    economy.try_enter_game().unwrap();
    economy.award_coins(75).unwrap();
    economy.consume_attempt().unwrap();

    let reopened = EconomyService::open(keep_alive, EconomyConfig::default()).unwrap();
    assert_eq!(reopened.coins(), 575);
    assert_eq!(reopened.remaining_attempts(), 2);
    assert_eq!(reopened.session().unwrap().coins, 575);
}
