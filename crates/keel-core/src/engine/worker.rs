//! The polling worker loop.
//!
//! Each poll drains the ids due at or before now from the due index,
//! removing every entry before its plan runs, then ticks the plans one at a
//! time in due order. A failing plan is reported on the event bus and left
//! unscheduled; it never stops the loop or the rest of the batch. Only a
//! failure to read or update the due index itself ends the loop.

use std::future::Future;
use std::sync::Arc;

use jiff::Timestamp;
use log::{info, warn};
use serde::Serialize;
use serde_json::json;

use super::Engine;
use crate::error::Result;

/// Outcome of one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Plans that ran a step
    pub processed: Vec<String>,
    /// Due ids with no plan record
    pub missing: Vec<String>,
    /// Plans whose step failed
    pub failed: Vec<String>,
}

impl PollReport {
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.missing.is_empty() && self.failed.is_empty()
    }
}

/// Long-running driver of the phase machine.
pub struct Worker {
    engine: Arc<Engine>,
}

impl Worker {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Registers every persisted plan as due now, so plans whose schedule
    /// entry was lost are picked up again. Returns the number registered.
    pub fn boot(&self) -> Result<usize> {
        let ids = self.engine.store.list_ids()?;
        let now = Timestamp::now();
        for id in &ids {
            self.engine.index.register(id, now)?;
        }
        info!("boot registered {} plans as due", ids.len());
        self.engine
            .events
            .publish("boot.tick_all", json!({"count": ids.len()}));
        Ok(ids.len())
    }

    /// Drains and runs everything due at or before `now`.
    pub async fn poll_once(&self, now: Timestamp) -> Result<PollReport> {
        let mut report = PollReport::default();
        for id in self.engine.index.drain_due(now)? {
            match self.engine.tick(&id).await {
                Ok(Some(_)) => report.processed.push(id),
                Ok(None) => report.missing.push(id),
                Err(e) => {
                    warn!("plan {id} failed: {e}");
                    self.engine
                        .events
                        .publish("worker.error", json!({"id": id, "error": e.to_string()}));
                    report.failed.push(id);
                }
            }
        }
        Ok(report)
    }

    /// Sleeps, polls, and repeats until `shutdown` resolves.
    ///
    /// Runs the boot pass first when the engine is configured for it.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.engine.config.boot_tick_all {
            self.boot()?;
        }

        let interval = self.engine.config.poll_interval;
        info!("worker polling every {interval:?}");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("worker stopping");
                    return Ok(());
                }
                () = tokio::time::sleep(interval) => {}
            }

            let report = self.poll_once(Timestamp::now()).await?;
            if !report.is_empty() {
                info!(
                    "poll ran {} plans ({} missing, {} failed)",
                    report.processed.len(),
                    report.missing.len(),
                    report.failed.len()
                );
            }
        }
    }
}
