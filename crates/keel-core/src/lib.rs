//! Core library for Keel, a durable phase engine for QPH plans.
//!
//! A plan moves through a fixed sequence of stages
//! (ESTABLISH, PHRASE, SEAL, SYNC, CONFIRM, SEND, VERIFY), one step per
//! tick, with the per-stage side effects (digesting, pinning, anchoring,
//! broadcasting) recorded in the plan's payload. Plans and their due times
//! survive restarts; a polling [`Worker`] drives due plans forward and a
//! [`Sweep`] re-drives side effects that never recorded success.
//!
//! # Display Architecture
//!
//! - **Domain Models** ([`models`]): Implement [`std::fmt::Display`] as
//!   markdown
//! - **Display Wrappers** ([`display`]): Operation outcomes and engine reports
//! - **Terminal Rendering**: Rich markdown output via the CLI's terminal
//!   renderer
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use keel_core::{params::CreatePlan, EngineBuilder, Sweep};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(
//!     EngineBuilder::new()
//!         .with_database_path(Some("keel-test.db"))
//!         .build()
//!         .await?,
//! );
//!
//! let plan = engine.create_plan(&CreatePlan {
//!     id: "evt_1".to_string(),
//!     ..Default::default()
//! })?;
//! println!("{plan}");
//!
//! // Drive the plan one step
//! engine.tick(&plan.id).await?;
//!
//! // Repair anything that never recorded success
//! let report = Sweep::new(engine.clone()).run().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod db;
pub mod display;
pub mod duration;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod params;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use display::{LocalDateTime, OperationResult};
pub use engine::{Engine, EngineBuilder, EngineConfig, PollReport, Sweep, SweepReport, Worker};
pub use error::{KeelError, Result};
pub use events::{ChannelSink, EventBus, EventSink, JsonLinesSink, LogSink};
pub use models::{AnchorOutcome, Event, Payload, Plan, Receipt, Scope, Stage};
pub use params::{CreatePlan, Id};
pub use store::{DueIndex, PlanStore, SqliteStore};
