//! The phase engine: state machine, ingress operations, worker loop and
//! reconciliation sweep.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   Ingress   │──▶│    PlanStore     │◀──│  Phase machine   │
//! │ (create/ack)│   │    DueIndex      │   │  (Engine::tick)  │
//! └─────────────┘   └──────────────────┘   └──────────────────┘
//!                            ▲                  ▲        ▲
//!                            │                  │        │
//!                      ┌─────┴─────┐      ┌─────┴──┐ ┌───┴────┐
//!                      │  Worker   │──────┘        │ │ Sweep  │
//!                      │  (poll)   │               │ │(repair)│
//!                      └───────────┘               │ └────────┘
//!                                       collaborators (hash, pin,
//!                                       anchor, webhook, telemetry)
//! ```
//!
//! [`Engine`] bundles the injected dependencies: the plan store, the due
//! index, the event bus and the side-effect collaborators. The [`Worker`]
//! and the [`Sweep`] each take an `Arc<Engine>`; there is no process-wide
//! state.
//!
//! ## Submodules
//!
//! - [`builder`]: configuration and construction of an [`Engine`]
//! - [`machine`]: the per-stage actions and the advance rule
//! - [`ingress`]: plan creation, acknowledgement and lookups
//! - [`worker`]: the polling loop over the due index
//! - [`sweep`]: the one-shot repair pass over every plan
//!
//! # Usage Examples
//!
//! ```rust
//! use keel_core::{params::{CreatePlan, Id}, EngineBuilder, Stage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new().with_in_memory_database().build().await?;
//!
//! engine.create_plan(&CreatePlan {
//!     id: "p1".to_string(),
//!     thread: Some("t1".to_string()),
//!     ..Default::default()
//! })?;
//!
//! for _ in 0..6 {
//!     engine.tick("p1").await?;
//! }
//! assert_eq!(engine.show_plan(&Id::from("p1"))?.stage, Stage::Verify);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;

use crate::{
    collaborators::{Anchor, Hasher, Pinner, Telemetry, Webhook},
    error::{KeelError, Result},
    events::EventBus,
    models::Plan,
    store::{DueIndex, PlanStore},
};

pub mod builder;
pub mod ingress;
pub mod machine;
pub mod sweep;
pub mod worker;


pub use builder::EngineBuilder;
pub use sweep::{Sweep, SweepReport};
pub use worker::{PollReport, Worker};

/// Default delay before a plan's next step becomes due.
pub const DEFAULT_TICK_DELAY: Duration = Duration::from_secs(1);

/// Default sleep between worker polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on a single external call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Scheduling and timeout knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay between one step and the next
    pub tick_delay: Duration,
    /// Sleep between worker polls
    pub poll_interval: Duration,
    /// Register every persisted plan as due when a worker starts
    pub boot_tick_all: bool,
    /// Upper bound on each anchor, pin, webhook or telemetry call
    pub call_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_delay: DEFAULT_TICK_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            boot_tick_all: false,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Dependencies and configuration shared by the state machine, the worker
/// and the sweep.
pub struct Engine {
    pub(crate) store: Arc<dyn PlanStore>,
    pub(crate) index: Arc<dyn DueIndex>,
    pub(crate) events: EventBus,
    pub(crate) hasher: Arc<dyn Hasher>,
    pub(crate) pinner: Arc<dyn Pinner>,
    pub(crate) anchor: Arc<dyn Anchor>,
    pub(crate) webhook: Arc<dyn Webhook>,
    pub(crate) telemetry: Arc<dyn Telemetry>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Stamps and writes the whole record.
    pub(crate) fn persist(&self, plan: &mut Plan) -> Result<()> {
        plan.updated_at = Timestamp::now();
        self.store.save(plan)
    }

    /// Makes the plan due `delay` from now, replacing any earlier entry.
    pub(crate) fn schedule_in(&self, id: &str, delay: Duration) -> Result<()> {
        self.index.register(id, due_after(Timestamp::now(), delay)?)
    }

    /// Runs an external call under the configured timeout.
    pub(crate) async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| KeelError::Timeout {
                operation: operation.to_string(),
                after: self.config.call_timeout,
            })?
    }
}

/// `now + delay` at millisecond resolution.
pub fn due_after(now: Timestamp, delay: Duration) -> Result<Timestamp> {
    let delay_ms = i64::try_from(delay.as_millis()).map_err(|_| {
        KeelError::invalid_input("delay").with_reason(format!("{delay:?} is too large"))
    })?;
    now.as_millisecond()
        .checked_add(delay_ms)
        .and_then(|ms| Timestamp::from_millisecond(ms).ok())
        .ok_or_else(|| {
            KeelError::invalid_input("delay")
                .with_reason(format!("{delay:?} after {now} is out of range"))
        })
}
