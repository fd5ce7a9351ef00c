//! Database schema initialization and migrations.

use std::time::Duration;

use crate::error::{DatabaseResultExt, Result};

/// How long a connection waits on a lock held by another process (the sweep
/// and the worker may share one file).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        self.connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        // Early databases stored plans without a correlation pointer column
        let has_scp_column: bool = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('plans') WHERE name = 'scp'",
                [],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .db_context("Failed to inspect plans table")?;

        if !has_scp_column {
            self.connection
                .execute("ALTER TABLE plans ADD COLUMN scp TEXT", [])
                .db_context("Failed to add scp column to plans table")?;
        }

        Ok(())
    }
}
