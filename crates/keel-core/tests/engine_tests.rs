mod common;

use std::sync::Arc;

use jiff::Timestamp;
use keel_core::{
    params::{CreatePlan, Id},
    DueIndex, JsonLinesSink, Receipt, SqliteStore, Stage, Sweep, Worker,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn create_params(id: &str) -> CreatePlan {
    CreatePlan {
        id: id.to_string(),
        thread: Some("th_it".to_string()),
        seed: Some(json!({"body": "ship it"})),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_plan_reaches_verify_across_restarts() {
    let (temp_dir, engine) = common::create_test_engine().await;
    engine.create_plan(&create_params("evt_1")).unwrap();
    engine.tick("evt_1").await.unwrap();
    engine.tick("evt_1").await.unwrap();
    let sealed = engine.show_plan(&Id::from("evt_1")).unwrap();
    drop(engine);

    let engine = Arc::new(common::open_engine(&temp_dir).await);
    let worker = Worker::new(engine.clone());
    for _ in 0..4 {
        worker.poll_once(Timestamp::now()).await.unwrap();
    }

    let plan = engine.show_plan(&Id::from("evt_1")).unwrap();
    assert_eq!(plan.stage, Stage::Verify);
    assert_eq!(plan.scp, sealed.scp);
    assert_eq!(plan.payload.sha256, sealed.payload.sha256);
    assert_eq!(plan.payload.extra.get("event"), Some(&json!({"body": "ship it"})));
    assert_eq!(plan.payload.sent, Some(true));
}

#[tokio::test]
async fn test_boot_recovers_lost_schedule() {
    let (temp_dir, engine) = common::create_test_engine().await;
    engine.create_plan(&create_params("evt_1")).unwrap();
    drop(engine);

    let store = SqliteStore::open(temp_dir.path().join("keel.db")).unwrap();
    assert!(store.remove("evt_1").unwrap());
    drop(store);

    let engine = Arc::new(common::open_engine(&temp_dir).await);
    let worker = Worker::new(engine.clone());
    assert!(worker.poll_once(Timestamp::now()).await.unwrap().is_empty());

    assert_eq!(worker.boot().unwrap(), 1);
    let report = worker.poll_once(Timestamp::now()).await.unwrap();

    assert_eq!(report.processed, vec!["evt_1".to_string()]);
    assert_eq!(engine.show_plan(&Id::from("evt_1")).unwrap().stage, Stage::Seal);
}

#[tokio::test]
async fn test_scope_counts_by_stage() {
    let (_temp_dir, engine) = common::create_test_engine().await;
    for id in ["a", "b", "c"] {
        engine.create_plan(&create_params(id)).unwrap();
    }
    for _ in 0..6 {
        engine.tick("c").await.unwrap();
    }

    let scope = engine.scope().unwrap();

    assert_eq!(scope.total, 3);
    assert_eq!(scope.by_stage.get(&Stage::Phrase), Some(&2));
    assert_eq!(scope.by_stage.get(&Stage::Verify), Some(&1));
    assert_eq!(scope.unfinished, vec!["a", "b"]);
}

#[tokio::test]
async fn test_sweep_then_acknowledge() {
    let (_temp_dir, engine) = common::create_test_engine().await;
    engine.create_plan(&create_params("evt_1")).unwrap();
    let engine = Arc::new(engine);

    Sweep::new(engine.clone()).run().await.unwrap();
    assert_eq!(
        engine.show_plan(&Id::from("evt_1")).unwrap().payload.receipts,
        Some(Receipt::Provisional)
    );

    engine.acknowledge(&Id::from("evt_1")).unwrap();
    Sweep::new(engine.clone()).run().await.unwrap();
    assert_eq!(
        engine.show_plan(&Id::from("evt_1")).unwrap().payload.receipts,
        Some(Receipt::Acknowledged)
    );
}

#[tokio::test]
async fn test_events_written_as_json_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let events_path = temp_dir.path().join("events.jsonl");
    let sink = JsonLinesSink::open(&events_path).expect("Failed to open event file");
    let engine = keel_core::EngineBuilder::new()
        .with_in_memory_database()
        .with_sink(Arc::new(sink))
        .build()
        .await
        .unwrap();

    engine.create_plan(&create_params("evt_1")).unwrap();
    engine.tick("evt_1").await.unwrap();

    let contents = std::fs::read_to_string(&events_path).unwrap();
    let events: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["topic"], "plan.created");
    assert_eq!(events[1]["topic"], "phase.phrase");
    assert_eq!(events[1]["data"]["id"], "evt_1");
}
