//! The reconciliation sweep.
//!
//! A stateless pass over every persisted plan that re-drives side effects
//! which never recorded success, whatever the plan's schedule state. An
//! anchor recorded as skipped (no signing material at the time) is retried.
//! Each side effect is gated on its success marker, so the sweep can run
//! repeatedly and alongside a worker.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use serde_json::json;

use super::Engine;
use crate::{
    error::Result,
    models::{Plan, Receipt},
};

/// What one sweep pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub anchored: usize,
    pub broadcast: usize,
    pub receipts: usize,
    pub failed: Vec<String>,
}

/// One-shot repair pass over all plans.
pub struct Sweep {
    engine: Arc<Engine>,
}

impl Sweep {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Reconciles every plan. Failures are per plan and never stop the pass;
    /// only failing to enumerate plans is an error.
    pub async fn run(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for id in self.engine.store.list_ids()? {
            match self.engine.store.load(&id) {
                Ok(Some(mut plan)) => {
                    report.scanned += 1;
                    if let Err(e) = self.reconcile(&mut plan, &mut report).await {
                        self.fail(&id, &e.to_string(), &mut report);
                    }
                }
                Ok(None) => {}
                Err(e) => self.fail(&id, &e.to_string(), &mut report),
            }
        }

        info!(
            "sweep scanned {} plans: {} anchored, {} broadcast, {} receipts, {} failed",
            report.scanned,
            report.anchored,
            report.broadcast,
            report.receipts,
            report.failed.len()
        );
        self.engine.events.publish(
            "sweep.completed",
            serde_json::to_value(&report).unwrap_or_default(),
        );
        Ok(report)
    }

    /// Re-drives each missing side effect independently. A failing anchor
    /// does not hold back the broadcast or the receipt; the first error is
    /// returned after the rest of the plan was repaired.
    async fn reconcile(&self, plan: &mut Plan, report: &mut SweepReport) -> Result<()> {
        let mut first_error = None;

        if plan.payload.sha256.is_some() && !plan.payload.is_anchored() {
            match self.engine.anchor_plan(plan).await {
                Ok(()) => {
                    self.engine.persist(plan)?;
                    if plan.payload.is_anchored() {
                        report.anchored += 1;
                    }
                }
                Err(e) => first_error = Some(e),
            }
        }

        if !plan.payload.is_sent() {
            match self.engine.broadcast_plan(plan).await {
                Ok(()) => {
                    self.engine.persist(plan)?;
                    report.broadcast += 1;
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if plan.payload.receipts.is_none() {
            plan.payload.receipts = Some(Receipt::Provisional);
            self.engine.persist(plan)?;
            self.engine.events.publish(
                "verify.receipts",
                json!({"id": plan.id, "receipts": Receipt::Provisional}),
            );
            report.receipts += 1;
        }

        self.engine
            .schedule_in(&plan.id, self.engine.config.tick_delay)?;
        first_error.map_or(Ok(()), Err)
    }

    fn fail(&self, id: &str, error: &str, report: &mut SweepReport) {
        warn!("sweep of plan {id} failed: {error}");
        self.engine
            .events
            .publish("sweep.error", json!({"id": id, "error": error}));
        report.failed.push(id.to_string());
    }
}
