use super::{upsert, LedgerStore};
use crate::{
    config::EconomyConfig,
    error::ArcadeResult,
    ledger::{EconomyRecord, SessionRecord},
};

pub const ECONOMY_DOCUMENT: &str = "economy";
pub const SESSION_DOCUMENT: &str = "session";

impl LedgerStore {
    // ── Economy ───────────────────────────────────────────────────

    /// Load the Economy Record. A missing or unreadable document is replaced
    /// by first-run defaults, which are written back before returning. Fields
    /// an older document lacks take the configured first-run values.
    pub fn load_economy(&self, config: &EconomyConfig) -> ArcadeResult<EconomyRecord> {
        let defaults = EconomyRecord::new(config);
        let parsed = match self.document(ECONOMY_DOCUMENT)? {
            None => {
                log::info!("economy document absent, creating defaults");
                None
            }
            Some(body) => match fill_missing(&body, &defaults) {
                Ok(filled) => Some(filled),
                Err(e) => {
                    log::warn!("economy document unreadable ({e}), substituting defaults");
                    None
                }
            },
        };

        match parsed {
            Some((mut record, filled)) => {
                if record.sanitize(config.daily_rewards.len()) || filled {
                    self.save_economy(&record)?;
                }
                Ok(record)
            }
            None => {
                self.save_economy(&defaults)?;
                Ok(defaults)
            }
        }
    }

    pub fn save_economy(&self, record: &EconomyRecord) -> ArcadeResult<()> {
        let body = serde_json::to_string(record)?;
        upsert(&self.conn, ECONOMY_DOCUMENT, &body)?;
        log::debug!("economy saved: coins={} attempts={}", record.coins, record.remaining_attempts);
        Ok(())
    }

    // ── Session ───────────────────────────────────────────────────

    /// Load the Session Record. `None` until the first game entry creates it;
    /// an unreadable document is discarded and also reported as `None`.
    pub fn load_session(&self) -> ArcadeResult<Option<SessionRecord>> {
        let Some(body) = self.document(SESSION_DOCUMENT)? else {
            return Ok(None);
        };
        match serde_json::from_str::<SessionRecord>(&body) {
            Ok(mut record) => {
                if record.sanitize() {
                    self.save_session(&record)?;
                }
                Ok(Some(record))
            }
            Err(e) => {
                log::warn!("session document unreadable ({e}), discarding it");
                self.delete_document(SESSION_DOCUMENT)?;
                Ok(None)
            }
        }
    }

    pub fn save_session(&self, record: &SessionRecord) -> ArcadeResult<()> {
        let body = serde_json::to_string(record)?;
        upsert(&self.conn, SESSION_DOCUMENT, &body)?;
        log::debug!("session saved: coins={} high_score={}", record.coins, record.high_score);
        Ok(())
    }

    /// Write both documents in one transaction: a later load sees either
    /// both new bodies or both old ones.
    pub fn save_both(&self, economy: &EconomyRecord, session: &SessionRecord) -> ArcadeResult<()> {
        let economy_body = serde_json::to_string(economy)?;
        let session_body = serde_json::to_string(session)?;

        let tx = self.conn.unchecked_transaction()?;
        upsert(&tx, ECONOMY_DOCUMENT, &economy_body)?;
        upsert(&tx, SESSION_DOCUMENT, &session_body)?;
        tx.commit()?;

        log::debug!(
            "ledger saved: coins={} attempts={} high_score={}",
            economy.coins,
            economy.remaining_attempts,
            session.high_score
        );
        Ok(())
    }
}

/// Parse `body`, taking any absent top-level field from `defaults`.
/// The flag is true when at least one field was filled in.
fn fill_missing(body: &str, defaults: &EconomyRecord) -> serde_json::Result<(EconomyRecord, bool)> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;
    let mut filled = false;
    if let (Some(fields), serde_json::Value::Object(fallback)) =
        (value.as_object_mut(), serde_json::to_value(defaults)?)
    {
        for (key, configured) in fallback {
            if !fields.contains_key(&key) {
                log::info!("economy document has no {key}, using configured default");
                fields.insert(key, configured);
                filled = true;
            }
        }
    }
    Ok((serde_json::from_value(value)?, filled))
}
