//! Storage seams: the plan store and the due-schedule index.
//!
//! Both are traits so the engine, worker and sweep receive them as injected
//! dependencies. [`SqliteStore`] implements both over one [`Database`].

use std::path::Path;
use std::sync::Mutex;

use jiff::Timestamp;

use crate::{
    db::Database,
    error::{KeelError, Result},
    models::Plan,
};

/// Durable key-value persistence for plan records.
///
/// Writes are whole-record upserts: the last `save` for an id wins.
pub trait PlanStore: Send + Sync {
    /// Persists a new plan, failing with `PlanExists` if the id is taken.
    fn insert(&self, plan: &Plan) -> Result<()>;

    /// Upserts the whole record.
    fn save(&self, plan: &Plan) -> Result<()>;

    fn load(&self, id: &str) -> Result<Option<Plan>>;

    /// Ids of every persisted plan.
    fn list_ids(&self) -> Result<Vec<String>>;

    /// Every persisted plan.
    fn list(&self) -> Result<Vec<Plan>>;
}

/// Time-ordered index of plan id to next eligible execution time.
pub trait DueIndex: Send + Sync {
    /// Inserts or overwrites the due time of `id`.
    fn register(&self, id: &str, due: Timestamp) -> Result<()>;

    /// Ids with a due time at or before `now`, earliest first, each once.
    fn due(&self, now: Timestamp) -> Result<Vec<String>>;

    /// Removes the entry for `id`; `true` only if this call removed it.
    fn remove(&self, id: &str) -> Result<bool>;

    fn due_at(&self, id: &str) -> Result<Option<Timestamp>>;

    /// Collects the due ids and removes each one, returning only the ids
    /// whose removal this caller won.
    fn drain_due(&self, now: Timestamp) -> Result<Vec<String>> {
        let mut drained = Vec::new();
        for id in self.due(now)? {
            if self.remove(&id)? {
                drained.push(id);
            }
        }
        Ok(drained)
    }
}

/// SQLite-backed plan store and due index sharing one connection.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Opens the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_database(Database::new(path)?))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Number of plans with a pending due time.
    pub fn pending_count(&self) -> Result<usize> {
        self.with_db(Database::pending_count)
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self.db.lock().map_err(|_| KeelError::Configuration {
            message: "Database handle poisoned by a panicked writer".to_string(),
        })?;
        f(&db)
    }
}

impl PlanStore for SqliteStore {
    fn insert(&self, plan: &Plan) -> Result<()> {
        self.with_db(|db| db.insert_plan(plan))
    }

    fn save(&self, plan: &Plan) -> Result<()> {
        self.with_db(|db| db.save_plan(plan))
    }

    fn load(&self, id: &str) -> Result<Option<Plan>> {
        self.with_db(|db| db.get_plan(id))
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        self.with_db(Database::list_plan_ids)
    }

    fn list(&self) -> Result<Vec<Plan>> {
        self.with_db(Database::list_plans)
    }
}

impl DueIndex for SqliteStore {
    fn register(&self, id: &str, due: Timestamp) -> Result<()> {
        self.with_db(|db| db.schedule(id, due))
    }

    fn due(&self, now: Timestamp) -> Result<Vec<String>> {
        self.with_db(|db| db.due_ids(now))
    }

    fn remove(&self, id: &str) -> Result<bool> {
        self.with_db(|db| db.unschedule(id))
    }

    fn due_at(&self, id: &str) -> Result<Option<Timestamp>> {
        self.with_db(|db| db.due_at(id))
    }
}
