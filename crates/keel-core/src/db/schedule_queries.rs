//! Due-schedule queries: one pending due time per plan, ordered by time.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use crate::error::{DatabaseResultExt, KeelError, Result};

const UPSERT_DUE_SQL: &str = "INSERT INTO schedule (plan_id, due_at) VALUES (?1, ?2) \
     ON CONFLICT(plan_id) DO UPDATE SET due_at = excluded.due_at";
const SELECT_DUE_SQL: &str =
    "SELECT plan_id FROM schedule WHERE due_at <= ?1 ORDER BY due_at ASC, plan_id ASC";
const SELECT_DUE_AT_SQL: &str = "SELECT due_at FROM schedule WHERE plan_id = ?1";
const DELETE_DUE_SQL: &str = "DELETE FROM schedule WHERE plan_id = ?1";
const COUNT_PENDING_SQL: &str = "SELECT COUNT(*) FROM schedule";

impl super::Database {
    /// Sets the due time for a plan, replacing any earlier one.
    pub fn schedule(&self, plan_id: &str, due: Timestamp) -> Result<()> {
        self.connection
            .execute(UPSERT_DUE_SQL, params![plan_id, due.as_millisecond()])
            .db_context("Failed to register due time")?;
        Ok(())
    }

    /// Ids due at or before `now`, earliest first. Entries are not removed.
    pub fn due_ids(&self, now: Timestamp) -> Result<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_DUE_SQL)
            .db_context("Failed to prepare due query")?;
        let ids = stmt
            .query_map(params![now.as_millisecond()], |row| row.get(0))
            .db_context("Failed to query due entries")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .db_context("Failed to read due entry")?;
        Ok(ids)
    }

    /// Removes a plan's due entry. Returns `true` only for the caller that
    /// actually deleted it.
    pub fn unschedule(&self, plan_id: &str) -> Result<bool> {
        let removed = self
            .connection
            .execute(DELETE_DUE_SQL, params![plan_id])
            .db_context("Failed to remove due entry")?;
        Ok(removed > 0)
    }

    /// The pending due time of a plan, if it has one.
    pub fn due_at(&self, plan_id: &str) -> Result<Option<Timestamp>> {
        let millis: Option<i64> = self
            .connection
            .query_row(SELECT_DUE_AT_SQL, params![plan_id], |row| row.get(0))
            .optional()
            .db_context("Failed to query due time")?;

        millis
            .map(|ms| {
                Timestamp::from_millisecond(ms).map_err(|e| KeelError::Configuration {
                    message: format!("Stored due time {ms} for plan {plan_id} is out of range: {e}"),
                })
            })
            .transpose()
    }

    /// Number of plans with a pending due time.
    pub fn pending_count(&self) -> Result<usize> {
        let count: i64 = self
            .connection
            .query_row(COUNT_PENDING_SQL, [], |row| row.get(0))
            .db_context("Failed to count due entries")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
