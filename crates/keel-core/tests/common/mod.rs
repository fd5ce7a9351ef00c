use std::time::Duration;

use keel_core::{Engine, EngineBuilder};
use tempfile::TempDir;

/// Helper function to create a test engine backed by a database file
pub async fn create_test_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = open_engine(&temp_dir).await;
    (temp_dir, engine)
}

/// Opens another engine over the same database file, as a restart would
pub async fn open_engine(temp_dir: &TempDir) -> Engine {
    EngineBuilder::new()
        .with_database_path(Some(temp_dir.path().join("keel.db")))
        .with_tick_delay(Duration::ZERO)
        .build()
        .await
        .expect("Failed to create engine")
}
