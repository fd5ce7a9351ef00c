//! Plan record persistence and queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, KeelError, Result},
    models::{Payload, Plan, Stage},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (id, thread, stage, scp, payload, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) ON CONFLICT(id) DO NOTHING";
const UPSERT_PLAN_SQL: &str = "INSERT INTO plans (id, thread, stage, scp, payload, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
     ON CONFLICT(id) DO UPDATE SET thread = excluded.thread, stage = excluded.stage, scp = excluded.scp, payload = excluded.payload, updated_at = excluded.updated_at";
const SELECT_PLAN_SQL: &str =
    "SELECT id, thread, stage, scp, payload, created_at, updated_at FROM plans WHERE id = ?1";
const SELECT_ALL_PLANS_SQL: &str =
    "SELECT id, thread, stage, scp, payload, created_at, updated_at FROM plans ORDER BY id";
const SELECT_PLAN_IDS_SQL: &str = "SELECT id FROM plans ORDER BY id";

impl super::Database {
    /// Inserts a new plan. Fails with `PlanExists` when the id is taken.
    pub fn insert_plan(&self, plan: &Plan) -> Result<()> {
        let payload = serde_json::to_string(&plan.payload)?;
        let inserted = self
            .connection
            .execute(
                INSERT_PLAN_SQL,
                params![
                    plan.id,
                    plan.thread,
                    plan.stage.as_str(),
                    plan.scp,
                    payload,
                    plan.created_at.to_string(),
                    plan.updated_at.to_string(),
                ],
            )
            .db_context("Failed to insert plan")?;

        if inserted == 0 {
            return Err(KeelError::PlanExists {
                id: plan.id.clone(),
            });
        }
        Ok(())
    }

    /// Writes the whole record, replacing whatever was stored under its id.
    pub fn save_plan(&self, plan: &Plan) -> Result<()> {
        let payload = serde_json::to_string(&plan.payload)?;
        self.connection
            .execute(
                UPSERT_PLAN_SQL,
                params![
                    plan.id,
                    plan.thread,
                    plan.stage.as_str(),
                    plan.scp,
                    payload,
                    plan.created_at.to_string(),
                    plan.updated_at.to_string(),
                ],
            )
            .db_context("Failed to save plan")?;
        Ok(())
    }

    /// Retrieves a plan by its ID.
    pub fn get_plan(&self, id: &str) -> Result<Option<Plan>> {
        self.connection
            .query_row(SELECT_PLAN_SQL, params![id], plan_from_row)
            .optional()
            .db_context("Failed to query plan")
    }

    /// Lists every persisted plan ordered by id.
    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ALL_PLANS_SQL)
            .db_context("Failed to prepare plan listing")?;
        let plans = stmt
            .query_map([], plan_from_row)
            .db_context("Failed to list plans")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read plan row")?;
        Ok(plans)
    }

    /// Lists the ids of every persisted plan ordered by id.
    pub fn list_plan_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLAN_IDS_SQL)
            .db_context("Failed to prepare plan id listing")?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .db_context("Failed to list plan ids")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .db_context("Failed to read plan id")?;
        Ok(ids)
    }
}

fn conversion_error(
    column: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    let stage_str: String = row.get(2)?;
    let stage = stage_str.parse::<Stage>().map_err(|reason| {
        conversion_error(
            2,
            std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
        )
    })?;
    let payload: Payload =
        serde_json::from_str(&row.get::<_, String>(4)?).map_err(|e| conversion_error(4, e))?;

    Ok(Plan {
        id: row.get(0)?,
        thread: row.get(1)?,
        stage,
        scp: row.get(3)?,
        payload,
        created_at: row
            .get::<_, String>(5)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(5, e))?,
        updated_at: row
            .get::<_, String>(6)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(6, e))?,
    })
}
