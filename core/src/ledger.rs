//! The two persisted documents: the lobby-side Economy Record and the
//! gameplay-side Session Record.
//!
//! Both serialise to the camelCase JSON shape other save contexts already
//! read and write. Unset dates are stored as empty strings.

use crate::{
    config::EconomyConfig,
    types::{Coins, Score},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomyRecord {
    pub coins: Coins,
    /// Position in the daily reward cycle.
    pub login_day_index: u32,
    #[serde(with = "blank_date")]
    pub last_claim_date: Option<NaiveDate>,
    #[serde(with = "blank_timestamp")]
    pub next_refill_time: Option<DateTime<Utc>>,
    pub remaining_attempts: u32,
}

impl EconomyRecord {
    /// A first-run record.
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            coins: config.starting_coins,
            login_day_index: 0,
            last_claim_date: None,
            next_refill_time: None,
            remaining_attempts: config.max_attempts,
        }
    }

    /// Pull out-of-range fields back into range. Returns true if anything changed.
    pub fn sanitize(&mut self, cycle_len: usize) -> bool {
        let last_day = cycle_len.saturating_sub(1) as u32;
        if self.login_day_index > last_day {
            log::warn!(
                "economy: login day index {} outside cycle, clamped to {last_day}",
                self.login_day_index
            );
            self.login_day_index = last_day;
            return true;
        }
        false
    }
}

impl Default for EconomyRecord {
    fn default() -> Self {
        Self::new(&EconomyConfig::default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub coins: Coins,
    pub high_score: Score,
    pub remaining_attempts: u32,
}

impl SessionRecord {
    /// Seed a new gameplay-side record from the lobby-side one.
    pub fn from_economy(economy: &EconomyRecord) -> Self {
        Self {
            coins: economy.coins,
            high_score: 0,
            remaining_attempts: economy.remaining_attempts,
        }
    }

    pub fn sanitize(&mut self) -> bool {
        if self.high_score < 0 {
            self.high_score = 0;
            return true;
        }
        false
    }
}

/// `Option<NaiveDate>` as `"YYYY-MM-DD"`, or `""` when unset.
mod blank_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.collect_str(&date.format("%Y-%m-%d")),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().map(str::trim).filter(|s| !s.is_empty()).and_then(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| log::warn!("ledger: unreadable claim date {s:?} treated as unset: {e}"))
                .ok()
        }))
    }
}

/// `Option<DateTime<Utc>>` as RFC 3339, or `""` when unset.
mod blank_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => s.serialize_str(&at.to_rfc3339()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().map(str::trim).filter(|s| !s.is_empty()).and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|e| log::warn!("ledger: unreadable refill time {s:?} treated as unset: {e}"))
                .ok()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn economy_record_uses_documented_field_names() {
        let record = EconomyRecord {
            coins: 150,
            login_day_index: 2,
            last_claim_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            next_refill_time: Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()),
            remaining_attempts: 1,
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["coins"], 150);
        assert_eq!(json["loginDayIndex"], 2);
        assert_eq!(json["lastClaimDate"], "2024-03-09");
        assert_eq!(json["nextRefillTime"], "2024-03-09T12:00:00+00:00");
        assert_eq!(json["remainingAttempts"], 1);
    }

    #[test]
    fn unset_dates_are_written_as_empty_strings() {
        let json = serde_json::to_value(EconomyRecord::default()).unwrap();
        assert_eq!(json["lastClaimDate"], "");
        assert_eq!(json["nextRefillTime"], "");
    }

    #[test]
    fn legacy_document_with_blank_and_missing_fields_loads() {
        let legacy = r#"{"coins": 320, "lastClaimDate": "", "nextRefillTime": "not a time"}"#;
        let record: EconomyRecord = serde_json::from_str(legacy).unwrap();

        assert_eq!(record.coins, 320);
        assert_eq!(record.login_day_index, 0);
        assert_eq!(record.last_claim_date, None);
        assert_eq!(record.next_refill_time, None);
        assert_eq!(record.remaining_attempts, 3);
    }

    #[test]
    fn sanitize_clamps_login_day_into_cycle() {
        let mut record = EconomyRecord { login_day_index: 11, ..EconomyRecord::default() };
        assert!(record.sanitize(7));
        assert_eq!(record.login_day_index, 6);
        assert!(!record.sanitize(7));
    }
}
