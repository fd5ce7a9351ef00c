//! Phase actions and the advance rule.
//!
//! One tick loads a plan, runs the action bound to its current stage,
//! persists the payload, publishes telemetry, moves the stage forward by
//! exactly one step and makes the plan due again after the tick delay. The
//! terminal stage runs nothing and is not rescheduled.
//!
//! Every action must tolerate being run again for the same stage: a crash
//! between the action and the advance, or a second worker, replays it.

use jiff::Timestamp;
use log::{debug, info};
use serde_json::json;

use super::Engine;
use crate::{
    collaborators::AnchorRequest,
    error::{KeelError, Result},
    models::{AnchorOutcome, Plan, Stage},
};

impl Engine {
    /// Runs one state-machine step for the plan with this id.
    ///
    /// Returns `Ok(None)` when no such plan exists. On error nothing after
    /// the failing action is persisted and the plan is not rescheduled.
    pub async fn tick(&self, id: &str) -> Result<Option<Plan>> {
        let Some(mut plan) = self.store.load(id)? else {
            debug!("tick for unknown plan {id} ignored");
            return Ok(None);
        };

        if plan.stage.has_action() {
            self.execute(&mut plan).await?;
            self.persist(&mut plan)?;
        }

        if let Err(e) = self
            .bounded("telemetry", self.telemetry.publish(&plan))
            .await
        {
            debug!("telemetry for plan {} dropped: {e}", plan.id);
        }

        let from = plan.stage;
        if plan.advance() {
            self.persist(&mut plan)?;
            self.schedule_in(&plan.id, self.config.tick_delay)?;
            info!("plan {} advanced {} -> {}", plan.id, from, plan.stage);
        }
        Ok(Some(plan))
    }

    /// Runs the action bound to the plan's current stage.
    pub(crate) async fn execute(&self, plan: &mut Plan) -> Result<()> {
        match plan.stage {
            Stage::Establish | Stage::Verify => Ok(()),
            Stage::Phrase => {
                self.phrase(plan);
                Ok(())
            }
            Stage::Seal => self.seal(plan),
            Stage::Sync => self.sync(plan).await,
            Stage::Confirm => self.anchor_plan(plan).await,
            Stage::Send => self.broadcast_plan(plan).await,
        }
    }

    /// Assigns the correlation pointer if the plan has none.
    fn phrase(&self, plan: &mut Plan) {
        let scp = plan
            .scp
            .get_or_insert_with(|| format!("SCP:{}-{}", plan.thread, Timestamp::now().as_second()));
        self.events
            .publish("phase.phrase", json!({"id": plan.id, "scp": scp}));
    }

    /// Digests the canonical payload. An unchanged payload re-seals to the
    /// same digest.
    fn seal(&self, plan: &mut Plan) -> Result<()> {
        let digest = self.hasher.digest(&plan.payload.canonical_bytes()?);
        plan.payload.sha256 = Some(digest.clone());
        self.events
            .publish("phase.seal", json!({"id": plan.id, "sha256": digest}));
        Ok(())
    }

    /// Derives the content address from the digest, once.
    async fn sync(&self, plan: &mut Plan) -> Result<()> {
        if let Some(cid) = &plan.payload.cid {
            debug!("plan {} already pinned as {cid}", plan.id);
            return Ok(());
        }

        let digest = plan
            .payload
            .sha256
            .clone()
            .ok_or_else(|| KeelError::action(Stage::Sync, "no digest to pin"))?;
        let cid = self.bounded("pin", self.pinner.pin(&digest)).await?;
        plan.payload.cid = Some(cid.clone());
        self.events
            .publish("ipfs.pinned", json!({"id": plan.id, "cid": cid}));
        Ok(())
    }

    /// Anchors the digest and records the outcome. A recorded successful
    /// anchor is never replaced; a recorded skip may be.
    pub(crate) async fn anchor_plan(&self, plan: &mut Plan) -> Result<()> {
        if plan.payload.is_anchored() {
            debug!("plan {} already anchored", plan.id);
            return Ok(());
        }

        let digest = plan
            .payload
            .sha256
            .clone()
            .ok_or_else(|| KeelError::action(Stage::Confirm, "no digest to anchor"))?;
        let blob = plan.payload.canonical_bytes()?;
        let request = AnchorRequest {
            plan_id: &plan.id,
            digest: &digest,
            blob: &blob,
        };
        let outcome = self.bounded("anchor", self.anchor.anchor(request)).await?;

        match &outcome {
            AnchorOutcome::Anchored {
                uuid,
                log_index,
                integrated_time,
            } => self.events.publish(
                "rekor.anchored",
                json!({
                    "id": plan.id,
                    "uuid": uuid,
                    "log_index": log_index,
                    "integrated_time": integrated_time,
                }),
            ),
            AnchorOutcome::Skipped { reason, simulate } => self.events.publish(
                "rekor.skip",
                json!({"id": plan.id, "reason": reason, "simulate": simulate}),
            ),
        }
        plan.payload.rekor = Some(outcome);
        Ok(())
    }

    /// Broadcasts the plan. A delivered marker, once set, stays set.
    pub(crate) async fn broadcast_plan(&self, plan: &mut Plan) -> Result<()> {
        let delivered = self
            .bounded("webhook broadcast", self.webhook.broadcast(plan))
            .await?;
        let sent = delivered || plan.payload.is_sent();
        plan.payload.sent = Some(sent);
        self.events
            .publish("send.broadcast", json!({"id": plan.id, "sent": sent}));
        Ok(())
    }
}
