//! Operations the ingress and operators call: create, acknowledge, look up.

use jiff::Timestamp;
use log::info;
use serde_json::json;

use super::Engine;
use crate::{
    error::{KeelError, Result},
    models::{Payload, Plan, Receipt, Scope},
    params::{CreatePlan, Id, ANONYMOUS_THREAD},
};

impl Engine {
    /// Creates a plan at the initial stage and makes it due immediately.
    ///
    /// # Errors
    ///
    /// Returns `KeelError::InvalidInput` for a blank id and
    /// `KeelError::PlanExists` when the id is already taken
    pub fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        let id = params.id.trim();
        if id.is_empty() {
            return Err(KeelError::invalid_input("id").with_reason("must not be empty"));
        }
        let thread = params
            .thread
            .as_deref()
            .map(str::trim)
            .filter(|thread| !thread.is_empty())
            .unwrap_or(ANONYMOUS_THREAD);

        let plan = Plan::new(
            id,
            thread,
            params.scp.clone(),
            Payload::seeded(params.seed.clone()),
        );
        self.store.insert(&plan)?;
        self.index.register(&plan.id, Timestamp::now())?;

        info!("created plan {} on thread {}", plan.id, plan.thread);
        self.events.publish(
            "plan.created",
            json!({"id": plan.id, "thread": plan.thread}),
        );
        Ok(plan)
    }

    /// Records an explicit acknowledgement on an existing plan.
    ///
    /// # Errors
    ///
    /// Returns `KeelError::PlanNotFound` when the plan does not exist; no
    /// record is created in that case
    pub fn acknowledge(&self, params: &Id) -> Result<Plan> {
        let mut plan = self.require_plan(&params.id)?;
        plan.payload.receipts = Some(Receipt::Acknowledged);
        self.persist(&mut plan)?;
        self.events
            .publish("verify.receipts", json!({"id": plan.id, "receipts": Receipt::Acknowledged}));
        Ok(plan)
    }

    /// Looks up one plan.
    pub fn show_plan(&self, params: &Id) -> Result<Plan> {
        self.require_plan(&params.id)
    }

    /// Plan totals by stage and the ids not yet at the terminal stage.
    pub fn scope(&self) -> Result<Scope> {
        Ok(Scope::from_plans(&self.store.list()?))
    }

    /// The pending due time of a plan, if any.
    pub fn due_at(&self, params: &Id) -> Result<Option<Timestamp>> {
        self.index.due_at(&params.id)
    }

    fn require_plan(&self, id: &str) -> Result<Plan> {
        self.store
            .load(id)?
            .ok_or_else(|| KeelError::PlanNotFound { id: id.to_string() })
    }
}
